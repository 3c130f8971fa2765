//! Application configuration constants.
//!
//! Centralizes the tunable values used across the quiz core.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

/// Load database path with priority: config.toml > .env > default.
///
/// Startup entry point for the embedding shell; the library itself never
/// opens a database implicitly.
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = std::fs::read_to_string("config.toml").ok();
    resolve_database_path(config.as_deref(), std::env::var("DATABASE_PATH").ok())
}

fn resolve_database_path(config_toml: Option<&str>, env_path: Option<String>) -> PathBuf {
    // Priority 1: config.toml
    if let Some(contents) = config_toml {
        if let Ok(config) = toml::from_str::<AppConfig>(contents) {
            if let Some(path) = config.database.and_then(|db| db.path) {
                tracing::info!("Using database from config.toml: {}", path);
                return PathBuf::from(path);
            }
        }
    }

    // Priority 2: .env DATABASE_PATH
    if let Some(path) = env_path {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from("data/drill.db");
    tracing::info!("Using default database path: {}", default.display());
    default
}

// ==================== Quiz Configuration ====================

/// Number of distractor choices per synthesized question (4 options total)
pub const DISTRACTOR_COUNT: usize = 3;

/// Bounded retries when resampling to avoid repeating the previous answer
pub const ANTI_REPEAT_ATTEMPTS: usize = 10;

// ==================== Progression Configuration ====================

/// Highest weekly unit per (level, category); unlock never exceeds this
pub const MAX_WEEK: u8 = 10;

/// Days in a weekly unit; completing all of them unlocks the next week
pub const DAYS_PER_WEEK: u8 = 7;

/// Settings key holding the serialized daily-completion set
pub const COMPLETION_SET_KEY: &str = "daily_done";

// ==================== Level Display ====================

use crate::domain::Level;

/// Display information for a proficiency level
pub struct LevelInfo {
    pub level: Level,
    pub name: &'static str,
}

/// All selectable levels, easiest first
pub const LEVELS: [LevelInfo; 5] = [
    LevelInfo { level: Level::N5, name: "JLPT N5" },
    LevelInfo { level: Level::N4, name: "JLPT N4" },
    LevelInfo { level: Level::N3, name: "JLPT N3" },
    LevelInfo { level: Level::N2, name: "JLPT N2" },
    LevelInfo { level: Level::N1, name: "JLPT N1" },
];

/// Get display name for a level
pub fn level_name(level: Level) -> &'static str {
    LEVELS
        .iter()
        .find(|l| l.level == level)
        .map(|l| l.name)
        .unwrap_or("Daily Practice")
}
