//! Item catalog loading and installation.
//!
//! Catalogs are JSON files shipping the practice items. Loading is strict:
//! one malformed item rejects the whole catalog, since installation replaces
//! the item store atomically and a partial catalog would silently shrink the
//! pools.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::db;
use crate::domain::{Category, ExamChoice, Item, Level, daily_key};
use crate::quiz::QuizError;

/// Top-level catalog file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
}

/// One item definition as written in catalog JSON.
///
/// Flat on purpose: which fields are required depends on `kind`, and the
/// conversion step enforces that rather than the deserializer.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItem {
    pub kind: String,
    pub level: String,
    pub category: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    /// Weekly-unit slot; both or neither of week/day must be given
    #[serde(default)]
    pub week: Option<u8>,
    #[serde(default)]
    pub day: Option<u8>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub session: Option<u16>,
    #[serde(default)]
    pub number: Option<u16>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub passage: Option<String>,
    #[serde(default)]
    pub choices: Vec<CatalogChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogChoice {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Error loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    IoError(String),
    ParseError(String),
    InvalidItem(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::IoError(e) => write!(f, "IO error: {}", e),
            CatalogError::ParseError(e) => write!(f, "Parse error: {}", e),
            CatalogError::InvalidItem(e) => write!(f, "Invalid item: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Load and validate a catalog file, returning store-ready items.
///
/// Item ids are 0 here; the store assigns rowids on insert.
pub fn load_catalog(path: &Path) -> Result<Vec<Item>, CatalogError> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::IoError(e.to_string()))?;

    let catalog: Catalog = serde_json::from_str(&content)
        .map_err(|e| CatalogError::ParseError(format!("{}: {}", path.display(), e)))?;

    let mut items = Vec::with_capacity(catalog.items.len());
    for (index, entry) in catalog.items.iter().enumerate() {
        let item = convert_item(entry)
            .map_err(|e| CatalogError::InvalidItem(format!("item {}: {}", index, e)))?;
        items.push(item);
    }

    tracing::info!("Loaded {} items from {}", items.len(), path.display());
    Ok(items)
}

/// Replace the item store with a loaded catalog.
pub fn install_catalog(conn: &Connection, items: &[Item]) -> Result<usize, QuizError> {
    Ok(db::replace_items(conn, items)?)
}

fn convert_item(entry: &CatalogItem) -> Result<Item, String> {
    let level = Level::from_str(&entry.level)
        .ok_or_else(|| format!("unknown level '{}'", entry.level))?;
    let category = Category::from_str(&entry.category)
        .ok_or_else(|| format!("unknown category '{}'", entry.category))?;

    let slot = match (entry.week, entry.day) {
        (Some(week), Some(day)) => Some(daily_key(level, category, week, day)),
        (None, None) => None,
        _ => return Err("week and day must be given together".to_string()),
    };

    match entry.kind.as_str() {
        "word" => Ok(Item::Word {
            id: 0,
            text: required(&entry.text, "text")?,
            reading: entry.reading.clone(),
            translation: required(&entry.translation, "translation")?,
            level,
            category,
            daily_key: slot,
        }),
        "sentence" => Ok(Item::Sentence {
            id: 0,
            text: required(&entry.text, "text")?,
            translation: required(&entry.translation, "translation")?,
            level,
            category,
            daily_key: slot,
        }),
        "exam" => {
            let choices = convert_choices(&entry.choices)?;
            Ok(Item::Exam {
                id: 0,
                year: entry.year.ok_or("exam item missing year")?,
                session: entry.session.ok_or("exam item missing session")?,
                number: entry.number.ok_or("exam item missing number")?,
                prompt: required(&entry.prompt, "prompt")?,
                passage: entry.passage.clone(),
                choices,
                level,
                category,
                daily_key: slot,
            })
        }
        other => Err(format!("unknown kind '{}'", other)),
    }
}

fn required(field: &Option<String>, name: &str) -> Result<String, String> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(format!("missing {}", name)),
    }
}

fn convert_choices(choices: &[CatalogChoice]) -> Result<Vec<ExamChoice>, String> {
    if choices.is_empty() {
        return Err("exam item has no choices".to_string());
    }
    let correct = choices.iter().filter(|c| c.is_correct).count();
    if correct != 1 {
        return Err(format!("exam item has {} correct choices, expected 1", correct));
    }
    if choices.iter().any(|c| c.text.trim().is_empty()) {
        return Err("exam choice has empty text".to_string());
    }
    Ok(choices
        .iter()
        .map(|c| ExamChoice {
            text: c.text.clone(),
            is_correct: c.is_correct,
            explanation: c.explanation.clone(),
        })
        .collect())
}

/// Serializes overlapping catalog reloads: only the most recently begun
/// reload may commit, later begins supersede earlier ones. Last write wins,
/// the store is never left with a mix of two catalogs.
pub struct ReloadCoordinator {
    current: u64,
}

impl ReloadCoordinator {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// Start a reload and get the token its commit must present.
    pub fn begin(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    /// Install `items` if `token` is still the latest reload.
    /// Returns false when the reload was superseded; the store is untouched.
    pub fn commit(
        &mut self,
        token: u64,
        conn: &Connection,
        items: &[Item],
    ) -> Result<bool, QuizError> {
        if token != self.current {
            tracing::debug!("Discarding superseded catalog reload (token {})", token);
            return Ok(false);
        }
        db::replace_items(conn, items)?;
        Ok(true)
    }
}

impl Default for ReloadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
