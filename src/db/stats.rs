//! Summary queries for progress screens

use rusqlite::{Connection, Result};

use crate::domain::Category;

/// Mistake counts grouped by category
#[derive(Debug, Clone)]
pub struct CategoryMistakes {
    pub category: Category,
    pub count: i64,
}

pub fn mistake_counts_by_category(conn: &Connection) -> Result<Vec<CategoryMistakes>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT category, COUNT(*) as n
    FROM mistakes
    GROUP BY category
    ORDER BY n DESC
    "#,
    )?;

    let counts = stmt
        .query_map([], |row| {
            let category_str: String = row.get(0)?;
            Ok((category_str, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .filter_map(|(s, count)| {
            Category::from_str(&s).map(|category| CategoryMistakes { category, count })
        })
        .collect();

    Ok(counts)
}

/// Get total stats: (items in store, mistakes logged)
pub fn get_total_stats(conn: &Connection) -> Result<(i64, i64)> {
    let total_items: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    let total_mistakes: i64 =
        conn.query_row("SELECT COUNT(*) FROM mistakes", [], |row| row.get(0))?;
    Ok((total_items, total_mistakes))
}
