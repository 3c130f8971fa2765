//! Persistent key-value settings

use rusqlite::{Connection, Result, params};

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
    let mut rows = stmt.query(params![key])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row.get(0)?))
    } else {
        Ok(None)
    }
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

// ==================== Playback Settings ====================

pub fn get_tts_enabled(conn: &Connection) -> Result<bool> {
    get_setting(conn, "tts_enabled").map(|v| v.as_deref() != Some("false"))
}

pub fn set_tts_enabled(conn: &Connection, enabled: bool) -> Result<()> {
    set_setting(conn, "tts_enabled", if enabled { "true" } else { "false" })
}
