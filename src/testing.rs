//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so test code never
//! duplicates table definitions.

use rusqlite::Connection;
use tempfile::TempDir;

/// Test environment: a migrated database in a temporary directory,
/// cleaned up automatically when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with the full schema (all migrations applied)
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("test.db");
        let conn = Connection::open(&db_path)?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Path to the database file, for code that opens its own connection.
    pub fn db_path(&self) -> std::path::PathBuf {
        self.temp.path().join("test.db")
    }
}
