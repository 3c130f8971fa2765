//! Audio playback seam.
//!
//! The quiz core never talks to a TTS engine directly; callers hand in a
//! `Speaker` and the core decides when to use it. Ships with no-op and
//! log-only implementations, platform shells provide the real one.

use rusqlite::Connection;

use crate::db;
use crate::db::LogOnError;

/// Reads a piece of text aloud. Implementations must be non-blocking.
pub trait Speaker {
    fn speak(&self, text: &str);

    /// Cancel any in-flight utterance. Default: nothing to cancel.
    fn stop(&self) {}
}

/// Speaker that does nothing. Used where audio is unavailable.
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn speak(&self, _text: &str) {}
}

/// Speaker that only logs, for development shells.
pub struct TracingSpeaker;

impl Speaker for TracingSpeaker {
    fn speak(&self, text: &str) {
        tracing::debug!("speak: {}", text);
    }
}

/// Speak `text` unless playback is disabled in settings.
/// A settings read failure counts as enabled; losing audio is the smaller
/// problem than losing it silently.
pub fn speak_if_enabled(conn: &Connection, speaker: &dyn Speaker, text: &str) {
    let enabled = db::get_tts_enabled(conn).log_warn("Could not read playback setting").unwrap_or(true);
    if enabled {
        speaker.speak(text);
    }
}
