//! Mistake log: append-only record of incorrectly answered items

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, params};

use crate::domain::{Category, Level};

/// A persisted log entry for an incorrectly answered item.
/// Never mutated; removed only by `clear_mistakes`.
#[derive(Debug, Clone)]
pub struct MistakeRecord {
    pub id: i64,
    pub item_id: i64,
    pub prompt: String,
    pub correct_answer: String,
    pub picked_answer: String,
    pub level: Level,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

pub fn append_mistake(
    conn: &Connection,
    item_id: i64,
    prompt: &str,
    correct_answer: &str,
    picked_answer: &str,
    level: Level,
    category: Category,
) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
    INSERT INTO mistakes (item_id, prompt, correct_answer, picked_answer, level, category, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            item_id,
            prompt,
            correct_answer,
            picked_answer,
            level.as_str(),
            category.as_str(),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// List all mistakes, newest first.
pub fn list_mistakes(conn: &Connection) -> Result<Vec<MistakeRecord>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, item_id, prompt, correct_answer, picked_answer, level, category, created_at
    FROM mistakes
    ORDER BY created_at DESC, id DESC
    "#,
    )?;

    let records = stmt
        .query_map([], |row| {
            let level_str: String = row.get(5)?;
            let category_str: String = row.get(6)?;
            let created_at_str: String = row.get(7)?;
            Ok(MistakeRecord {
                id: row.get(0)?,
                item_id: row.get(1)?,
                prompt: row.get(2)?,
                correct_answer: row.get(3)?,
                picked_answer: row.get(4)?,
                level: Level::from_str(&level_str).unwrap_or(Level::N5),
                category: Category::from_str(&category_str).unwrap_or(Category::Vocabulary),
                created_at: DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(records)
}

/// Remove every mistake record. Returns how many were deleted.
pub fn clear_mistakes(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM mistakes", [])?;
    tracing::info!("Cleared {} mistake records", deleted);
    Ok(deleted)
}

pub fn count_mistakes(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM mistakes", [], |row| row.get(0))
}
