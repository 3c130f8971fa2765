//! Pool filtering: selection criteria -> candidate item list.
//!
//! Randomized criteria (the adjacent-level pair) are resolved to concrete
//! values BEFORE the store query runs; the filter itself never weights
//! results. Year/session left unset act as wildcards.

use rand::Rng;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::domain::{Category, Item, Level};
use crate::quiz::QuizError;

/// Level selection for a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelFilter {
    /// One concrete level
    Exact(Level),
    /// Randomized pair: one of two adjacent levels, chosen at resolve time
    Either(Level, Level),
    /// All levels
    Any,
}

impl LevelFilter {
    /// Parse from settings string format: "any", "n3", or "n3+n2"
    pub fn parse(s: &str) -> Self {
        if s == "any" || s.is_empty() {
            return LevelFilter::Any;
        }
        if let Some((a, b)) = s.split_once('+') {
            if let (Some(first), Some(second)) = (Level::from_str(a), Level::from_str(b)) {
                return LevelFilter::Either(first, second);
            }
        }
        match Level::from_str(s) {
            Some(level) => LevelFilter::Exact(level),
            None => LevelFilter::Any,
        }
    }

    pub fn to_settings(&self) -> String {
        match self {
            LevelFilter::Exact(level) => level.as_str().to_string(),
            LevelFilter::Either(a, b) => format!("{}+{}", a.as_str(), b.as_str()),
            LevelFilter::Any => "any".to_string(),
        }
    }
}

/// Practice-selection criteria. `None` year/session match any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCriteria {
    pub level: LevelFilter,
    pub category: Option<Category>,
    pub year: Option<u16>,
    pub session: Option<u16>,
}

impl PoolCriteria {
    pub fn new(level: LevelFilter, category: Option<Category>) -> Self {
        Self {
            level,
            category,
            year: None,
            session: None,
        }
    }

    /// Resolve randomized parts to concrete filter values.
    /// `Either` picks one of its two levels uniformly; `Any` stays a wildcard.
    pub fn resolve(&self) -> ResolvedCriteria {
        let level = match self.level {
            LevelFilter::Exact(level) => Some(level),
            LevelFilter::Either(a, b) => {
                let mut rng = rand::rng();
                Some(if rng.random_range(0..2) == 0 { a } else { b })
            }
            LevelFilter::Any => None,
        };

        ResolvedCriteria {
            level,
            category: self.category,
            year: self.year,
            session: self.session,
        }
    }
}

/// Criteria with all randomness resolved; maps 1:1 onto the store query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCriteria {
    pub level: Option<Level>,
    pub category: Option<Category>,
    pub year: Option<u16>,
    pub session: Option<u16>,
}

impl ResolvedCriteria {
    /// Whether an item satisfies every non-wildcard field.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(level) = self.level {
            if item.level() != level {
                return false;
            }
        }
        if let Some(category) = self.category {
            if item.category() != category {
                return false;
            }
        }
        if self.year.is_some() || self.session.is_some() {
            match item {
                Item::Exam { year, session, .. } => {
                    if let Some(y) = self.year {
                        if *year != y {
                            return false;
                        }
                    }
                    if let Some(s) = self.session {
                        if *session != s {
                            return false;
                        }
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// Filter the item store down to the candidate pool for `criteria`.
/// Fails with `EmptyPool` when nothing matches; callers surface a message
/// rather than crash.
pub fn filter_pool(conn: &Connection, criteria: &PoolCriteria) -> Result<Vec<Item>, QuizError> {
    let resolved = criteria.resolve();
    let items = db::query_items(
        conn,
        resolved.level,
        resolved.category,
        resolved.year,
        resolved.session,
    )?;

    if items.is_empty() {
        tracing::debug!("Pool filter matched nothing: {:?}", resolved);
        return Err(QuizError::EmptyPool);
    }
    Ok(items)
}

/// Exact-match lookup of a daily practice set.
pub fn filter_daily(conn: &Connection, key: &str) -> Result<Vec<Item>, QuizError> {
    let items = db::query_by_daily_key(conn, key)?;
    if items.is_empty() {
        tracing::debug!("No items under daily key {}", key);
        return Err(QuizError::EmptyPool);
    }
    Ok(items)
}
