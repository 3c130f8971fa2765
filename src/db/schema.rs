use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create tables with COMPLETE schema for new databases
    // Migrations below handle upgrades for existing databases
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS items (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      kind TEXT NOT NULL,
      prompt TEXT NOT NULL,
      reading TEXT,
      translation TEXT,
      passage TEXT,
      level TEXT NOT NULL,
      category TEXT NOT NULL,
      exam_year INTEGER,
      exam_session INTEGER,
      question_no INTEGER,
      daily_key TEXT
    );

    CREATE TABLE IF NOT EXISTS item_choices (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      item_id INTEGER NOT NULL,
      position INTEGER NOT NULL,
      text TEXT NOT NULL,
      is_correct INTEGER NOT NULL DEFAULT 0,
      explanation TEXT,
      FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS mistakes (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      item_id INTEGER NOT NULL,
      prompt TEXT NOT NULL,
      correct_answer TEXT NOT NULL,
      picked_answer TEXT NOT NULL,
      level TEXT NOT NULL,
      category TEXT NOT NULL,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );

    -- Default settings
    INSERT OR IGNORE INTO settings (key, value) VALUES ('tts_enabled', 'true');
    INSERT OR IGNORE INTO settings (key, value) VALUES ('daily_done', '');

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_items_level_category ON items(level, category);
    CREATE INDEX IF NOT EXISTS idx_items_daily_key ON items(daily_key);
    CREATE INDEX IF NOT EXISTS idx_item_choices_item_id ON item_choices(item_id);
    CREATE INDEX IF NOT EXISTS idx_mistakes_created_at ON mistakes(created_at);
    "#,
    )?;

    // ============================================================
    // MIGRATIONS FOR EXISTING DATABASES
    // These are no-ops for new databases (columns already exist)
    // ============================================================

    // Migration: daily practice sets (daily_key added after initial release)
    add_column_if_missing(conn, "items", "daily_key", "TEXT")?;

    // Migration: reading passages for exam items
    add_column_if_missing(conn, "items", "passage", "TEXT")?;

    // Migration: per-choice explanations
    add_column_if_missing(conn, "item_choices", "explanation", "TEXT")?;

    Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    conn.prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
        .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    column_def: &str,
) -> Result<()> {
    if !column_exists(conn, table, column) {
        conn.execute(
            &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
            [],
        )?;
    }
    Ok(())
}
