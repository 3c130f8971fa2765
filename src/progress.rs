//! Weekly unlock progression.
//!
//! Each (level, category) pair has an independent ledger: a persisted
//! unlocked-week marker plus a set of completed practice days. Completing
//! all seven days of the highest unlocked week advances the marker by
//! exactly one. The marker never regresses.

use std::collections::BTreeSet;

use rusqlite::{Connection, Result};

use crate::config::{COMPLETION_SET_KEY, DAYS_PER_WEEK, MAX_WEEK};
use crate::db::settings::{get_setting, set_setting};
use crate::domain::{Category, Level, daily_key};

fn unlock_key(level: Level, category: Category) -> String {
    format!("unlocked_week:{}:{}", level.as_str(), category.as_str())
}

/// Highest unlocked week for this ledger. Week 1 is always available.
pub fn get_unlocked_week(conn: &Connection, level: Level, category: Category) -> Result<u8> {
    let week = get_setting(conn, &unlock_key(level, category))?
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(1);
    Ok(week.clamp(1, MAX_WEEK))
}

/// Persist the unlocked-week marker, clamped to the valid range.
pub fn set_unlocked_week(
    conn: &Connection,
    level: Level,
    category: Category,
    week: u8,
) -> Result<()> {
    let week = week.clamp(1, MAX_WEEK);
    set_setting(conn, &unlock_key(level, category), &week.to_string())
}

fn parse_completion_set(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_completion_set(conn: &Connection) -> Result<BTreeSet<String>> {
    let raw = get_setting(conn, COMPLETION_SET_KEY)?.unwrap_or_default();
    Ok(parse_completion_set(&raw))
}

fn store_completion_set(conn: &Connection, set: &BTreeSet<String>) -> Result<()> {
    let joined = set.iter().cloned().collect::<Vec<_>>().join(",");
    set_setting(conn, COMPLETION_SET_KEY, &joined)
}

/// Whether the given practice day has been completed.
pub fn is_practice_done(
    conn: &Connection,
    level: Level,
    category: Category,
    week: u8,
    day: u8,
) -> Result<bool> {
    let set = load_completion_set(conn)?;
    Ok(set.contains(&daily_key(level, category, week, day)))
}

/// Record a completed practice day and advance the unlock marker when the
/// whole week is done.
///
/// The completion insert and any unlock advance commit atomically. Marking
/// an already-completed day is a no-op for the set, and the `week >=
/// unlocked` guard makes re-marking a finished week idempotent for the
/// marker too. Returns whether the marker advanced.
pub fn mark_practice_done(
    conn: &Connection,
    level: Level,
    category: Category,
    week: u8,
    day: u8,
) -> Result<bool> {
    if !(1..=MAX_WEEK).contains(&week) || !(1..=DAYS_PER_WEEK).contains(&day) {
        tracing::warn!("Ignoring out-of-range practice mark: week {} day {}", week, day);
        return Ok(false);
    }

    let tx = conn.unchecked_transaction()?;

    let mut set = load_completion_set(&tx)?;
    if set.insert(daily_key(level, category, week, day)) {
        store_completion_set(&tx, &set)?;
    }

    let week_done =
        (1..=DAYS_PER_WEEK).all(|d| set.contains(&daily_key(level, category, week, d)));
    let unlocked = get_unlocked_week(&tx, level, category)?;

    let mut advanced = false;
    if week_done && week >= unlocked && week < MAX_WEEK {
        set_unlocked_week(&tx, level, category, week + 1)?;
        advanced = true;
        tracing::info!(
            "Unlocked week {} for {} {}",
            week + 1,
            level.as_str(),
            category.as_str()
        );
    }

    tx.commit()?;
    Ok(advanced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_default_unlocked_week_is_one() {
        let env = TestEnv::new().unwrap();
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N3, Category::Grammar).unwrap(),
            1
        );
    }

    #[test]
    fn test_set_unlocked_week_clamps() {
        let env = TestEnv::new().unwrap();
        set_unlocked_week(&env.conn, Level::N3, Category::Grammar, 0).unwrap();
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N3, Category::Grammar).unwrap(),
            1
        );
        set_unlocked_week(&env.conn, Level::N3, Category::Grammar, 99).unwrap();
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N3, Category::Grammar).unwrap(),
            MAX_WEEK
        );
    }

    #[test]
    fn test_mark_practice_done_is_recorded() {
        let env = TestEnv::new().unwrap();
        assert!(!is_practice_done(&env.conn, Level::N4, Category::Vocabulary, 1, 3).unwrap());
        mark_practice_done(&env.conn, Level::N4, Category::Vocabulary, 1, 3).unwrap();
        assert!(is_practice_done(&env.conn, Level::N4, Category::Vocabulary, 1, 3).unwrap());
    }

    #[test]
    fn test_full_week_advances_exactly_one() {
        let env = TestEnv::new().unwrap();
        set_unlocked_week(&env.conn, Level::N3, Category::Grammar, 2).unwrap();

        for day in 1..=6 {
            let advanced =
                mark_practice_done(&env.conn, Level::N3, Category::Grammar, 2, day).unwrap();
            assert!(!advanced, "advanced early on day {}", day);
        }
        let advanced = mark_practice_done(&env.conn, Level::N3, Category::Grammar, 2, 7).unwrap();
        assert!(advanced);
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N3, Category::Grammar).unwrap(),
            3
        );
    }

    #[test]
    fn test_remarking_finished_week_is_idempotent() {
        let env = TestEnv::new().unwrap();
        for day in 1..=7 {
            mark_practice_done(&env.conn, Level::N5, Category::Grammar, 1, day).unwrap();
        }
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N5, Category::Grammar).unwrap(),
            2
        );

        let advanced = mark_practice_done(&env.conn, Level::N5, Category::Grammar, 1, 4).unwrap();
        assert!(!advanced);
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N5, Category::Grammar).unwrap(),
            2
        );
    }

    #[test]
    fn test_lower_week_never_regresses_marker() {
        let env = TestEnv::new().unwrap();
        set_unlocked_week(&env.conn, Level::N2, Category::Reading, 5).unwrap();

        for day in 1..=7 {
            let advanced =
                mark_practice_done(&env.conn, Level::N2, Category::Reading, 2, day).unwrap();
            assert!(!advanced);
        }
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N2, Category::Reading).unwrap(),
            5
        );
    }

    #[test]
    fn test_final_week_never_advances_past_max() {
        let env = TestEnv::new().unwrap();
        set_unlocked_week(&env.conn, Level::N1, Category::Listening, MAX_WEEK).unwrap();

        for day in 1..=7 {
            let advanced =
                mark_practice_done(&env.conn, Level::N1, Category::Listening, MAX_WEEK, day)
                    .unwrap();
            assert!(!advanced);
        }
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N1, Category::Listening).unwrap(),
            MAX_WEEK
        );
    }

    #[test]
    fn test_ledgers_are_independent() {
        let env = TestEnv::new().unwrap();
        for day in 1..=7 {
            mark_practice_done(&env.conn, Level::N3, Category::Grammar, 1, day).unwrap();
        }
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N3, Category::Grammar).unwrap(),
            2
        );
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N3, Category::Vocabulary).unwrap(),
            1
        );
        assert_eq!(
            get_unlocked_week(&env.conn, Level::N2, Category::Grammar).unwrap(),
            1
        );
    }

    #[test]
    fn test_out_of_range_mark_ignored() {
        let env = TestEnv::new().unwrap();
        assert!(!mark_practice_done(&env.conn, Level::N3, Category::Grammar, 0, 1).unwrap());
        assert!(!mark_practice_done(&env.conn, Level::N3, Category::Grammar, 1, 8).unwrap());
        assert!(!mark_practice_done(&env.conn, Level::N3, Category::Grammar, 11, 1).unwrap());
        assert!(!is_practice_done(&env.conn, Level::N3, Category::Grammar, 1, 8).unwrap());
    }
}
