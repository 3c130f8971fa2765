//! Item store CRUD and query operations

use rusqlite::types::Value;
use rusqlite::{Connection, Result, params, params_from_iter};

use crate::domain::{Category, ExamChoice, Item, Level};

pub fn insert_item(conn: &Connection, item: &Item) -> Result<i64> {
    match item {
        Item::Word {
            text,
            reading,
            translation,
            level,
            category,
            daily_key,
            ..
        } => {
            conn.execute(
                r#"
    INSERT INTO items (kind, prompt, reading, translation, level, category, daily_key)
    VALUES ('word', ?1, ?2, ?3, ?4, ?5, ?6)
    "#,
                params![
                    text,
                    reading,
                    translation,
                    level.as_str(),
                    category.as_str(),
                    daily_key,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
        Item::Sentence {
            text,
            translation,
            level,
            category,
            daily_key,
            ..
        } => {
            conn.execute(
                r#"
    INSERT INTO items (kind, prompt, translation, level, category, daily_key)
    VALUES ('sentence', ?1, ?2, ?3, ?4, ?5)
    "#,
                params![text, translation, level.as_str(), category.as_str(), daily_key],
            )?;
            Ok(conn.last_insert_rowid())
        }
        Item::Exam {
            year,
            session,
            number,
            prompt,
            passage,
            choices,
            level,
            category,
            daily_key,
            ..
        } => {
            conn.execute(
                r#"
    INSERT INTO items (kind, prompt, passage, level, category, exam_year, exam_session, question_no, daily_key)
    VALUES ('exam', ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
                params![
                    prompt,
                    passage,
                    level.as_str(),
                    category.as_str(),
                    year,
                    session,
                    number,
                    daily_key,
                ],
            )?;
            let item_id = conn.last_insert_rowid();
            for (position, choice) in choices.iter().enumerate() {
                conn.execute(
                    r#"
    INSERT INTO item_choices (item_id, position, text, is_correct, explanation)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
                    params![
                        item_id,
                        position as i64,
                        choice.text,
                        choice.is_correct,
                        choice.explanation,
                    ],
                )?;
            }
            Ok(item_id)
        }
    }
}

pub fn get_item_by_id(conn: &Connection, id: i64) -> Result<Option<Item>> {
    let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", ITEM_SELECT))?;

    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        let raw = row_to_raw(row)?;
        Ok(Some(raw_to_item(conn, raw)?))
    } else {
        Ok(None)
    }
}

/// Query items by criteria. `None` fields are wildcards.
pub fn query_items(
    conn: &Connection,
    level: Option<Level>,
    category: Option<Category>,
    year: Option<u16>,
    session: Option<u16>,
) -> Result<Vec<Item>> {
    let mut conditions = vec!["1=1".to_string()];
    let mut values: Vec<Value> = Vec::new();
    if let Some(lv) = level {
        conditions.push("level = ?".to_string());
        values.push(Value::Text(lv.as_str().to_string()));
    }
    if let Some(cat) = category {
        conditions.push("category = ?".to_string());
        values.push(Value::Text(cat.as_str().to_string()));
    }
    if let Some(y) = year {
        conditions.push("exam_year = ?".to_string());
        values.push(Value::Integer(y as i64));
    }
    if let Some(s) = session {
        conditions.push("exam_session = ?".to_string());
        values.push(Value::Integer(s as i64));
    }

    let query = format!("{} WHERE {} ORDER BY id ASC", ITEM_SELECT, conditions.join(" AND "));
    let mut stmt = conn.prepare(&query)?;

    let raws = stmt
        .query_map(params_from_iter(values), row_to_raw)?
        .collect::<Result<Vec<_>>>()?;

    raws.into_iter().map(|raw| raw_to_item(conn, raw)).collect()
}

/// Exact-match lookup for a daily practice set.
pub fn query_by_daily_key(conn: &Connection, key: &str) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE daily_key = ?1 ORDER BY id ASC",
        ITEM_SELECT
    ))?;

    let raws = stmt
        .query_map(params![key], row_to_raw)?
        .collect::<Result<Vec<_>>>()?;

    raws.into_iter().map(|raw| raw_to_item(conn, raw)).collect()
}

/// Total number of items in the store. Lets callers distinguish an empty
/// filter match from a store that has not been loaded yet.
pub fn count_items(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
}

/// Replace the entire item collection in one transaction (resync).
/// Either all items land or the previous contents stay untouched.
pub fn replace_items(conn: &Connection, items: &[Item]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM item_choices", [])?;
    tx.execute("DELETE FROM items", [])?;
    for item in items {
        insert_item(&tx, item)?;
    }
    tx.commit()?;
    tracing::info!("Item store replaced with {} items", items.len());
    Ok(items.len())
}

pub fn get_item_choices(conn: &Connection, item_id: i64) -> Result<Vec<ExamChoice>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT text, is_correct, explanation
    FROM item_choices
    WHERE item_id = ?1
    ORDER BY position ASC
    "#,
    )?;

    let choices = stmt
        .query_map(params![item_id], |row| {
            let is_correct: i64 = row.get(1)?;
            Ok(ExamChoice {
                text: row.get(0)?,
                is_correct: is_correct != 0,
                explanation: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(choices)
}

const ITEM_SELECT: &str = r#"
    SELECT id, kind, prompt, reading, translation, passage, level, category,
           exam_year, exam_session, question_no, daily_key
    FROM items"#;

/// Intermediate row form; exam choices are fetched in a second query.
struct RawItem {
    id: i64,
    kind: String,
    prompt: String,
    reading: Option<String>,
    translation: Option<String>,
    passage: Option<String>,
    level: Level,
    category: Category,
    exam_year: Option<i64>,
    exam_session: Option<i64>,
    question_no: Option<i64>,
    daily_key: Option<String>,
}

fn row_to_raw(row: &rusqlite::Row) -> Result<RawItem> {
    let level_str: String = row.get(6)?;
    let category_str: String = row.get(7)?;

    Ok(RawItem {
        id: row.get(0)?,
        kind: row.get(1)?,
        prompt: row.get(2)?,
        reading: row.get(3)?,
        translation: row.get(4)?,
        passage: row.get(5)?,
        level: Level::from_str(&level_str).unwrap_or(Level::N5),
        category: Category::from_str(&category_str).unwrap_or(Category::Vocabulary),
        exam_year: row.get(8)?,
        exam_session: row.get(9)?,
        question_no: row.get(10)?,
        daily_key: row.get(11)?,
    })
}

fn raw_to_item(conn: &Connection, raw: RawItem) -> Result<Item> {
    let item = match raw.kind.as_str() {
        "sentence" => Item::Sentence {
            id: raw.id,
            text: raw.prompt,
            translation: raw.translation.unwrap_or_default(),
            level: raw.level,
            category: raw.category,
            daily_key: raw.daily_key,
        },
        "exam" => Item::Exam {
            id: raw.id,
            year: raw.exam_year.unwrap_or(0) as u16,
            session: raw.exam_session.unwrap_or(0) as u16,
            number: raw.question_no.unwrap_or(0) as u16,
            prompt: raw.prompt,
            passage: raw.passage,
            choices: get_item_choices(conn, raw.id)?,
            level: raw.level,
            category: raw.category,
            daily_key: raw.daily_key,
        },
        // Unknown kinds fall back to word, the original item shape
        _ => Item::Word {
            id: raw.id,
            text: raw.prompt,
            reading: raw.reading,
            translation: raw.translation.unwrap_or_default(),
            level: raw.level,
            category: raw.category,
            daily_key: raw.daily_key,
        },
    };
    Ok(item)
}
