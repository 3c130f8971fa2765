pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod playback;
pub mod pool;
pub mod progress;
pub mod quiz;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
