//! Drill session state machine.
//!
//! A session owns a candidate pool snapshot and the current question, and
//! tracks score across rounds. Loading is split into begin/finish halves so
//! overlapping loads can be detected: each `begin_init` bumps a generation
//! token and a `finish_init` carrying a superseded token is discarded without
//! touching session state.

use rusqlite::Connection;

use crate::db;
use crate::db::LogOnError;
use crate::domain::{Item, Question};
use crate::pool::{self, PoolCriteria};
use crate::quiz::{QuizError, synthesize};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, or a load is in flight
    Loading,
    /// A question is displayed, awaiting a pick and submit
    Ready,
    /// The pick was graded; reveal and await next()
    Answered,
    /// The pool matched nothing; not an error
    Empty,
    /// Storage failed during load; message in `error_message()`
    Error,
}

pub struct DrillSession {
    state: SessionState,
    pool: Vec<Item>,
    question: Option<Question>,
    picked: Option<usize>,
    score: u32,
    attempts: u32,
    error: Option<String>,
    generation: u64,
}

impl DrillSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Loading,
            pool: Vec::new(),
            question: None,
            picked: None,
            score: 0,
            attempts: 0,
            error: None,
            generation: 0,
        }
    }

    // ==================== Loading ====================

    /// Start a (re)load. Returns the token that the matching `finish_init`
    /// must present; any earlier in-flight load is thereby superseded.
    pub fn begin_init(&mut self) -> u64 {
        self.generation += 1;
        self.state = SessionState::Loading;
        self.generation
    }

    /// Complete a load started with `begin_init`.
    ///
    /// Returns false when `token` is stale, in which case nothing changes.
    /// An applied load starts a fresh session: the pool is replaced and the
    /// counters reset whether the result has items or none. Only a storage
    /// failure leaves the previous counters in place.
    pub fn finish_init(&mut self, token: u64, result: Result<Vec<Item>, QuizError>) -> bool {
        if token != self.generation {
            tracing::debug!("Discarding superseded load (token {} < {})", token, self.generation);
            return false;
        }

        match result {
            Ok(items) => {
                self.pool = items;
                self.score = 0;
                self.attempts = 0;
                self.error = None;
                self.present(None);
            }
            Err(QuizError::EmptyPool) => {
                self.pool.clear();
                self.question = None;
                self.score = 0;
                self.attempts = 0;
                self.state = SessionState::Empty;
            }
            Err(e) => {
                tracing::warn!("Session load failed: {}", e);
                self.error = Some(e.to_string());
                self.state = SessionState::Error;
            }
        }
        true
    }

    /// Synchronous load: filter the store by `criteria` in one step.
    pub fn load(&mut self, conn: &Connection, criteria: &PoolCriteria) -> u64 {
        let token = self.begin_init();
        let result = pool::filter_pool(conn, criteria);
        self.finish_init(token, result);
        token
    }

    /// Synchronous load of a daily practice set.
    pub fn load_daily(&mut self, conn: &Connection, key: &str) -> u64 {
        let token = self.begin_init();
        let result = pool::filter_daily(conn, key);
        self.finish_init(token, result);
        token
    }

    /// Synthesize and display a question, avoiding `previous` as the answer.
    fn present(&mut self, previous: Option<i64>) {
        match synthesize(&self.pool, previous) {
            Ok(question) => {
                self.question = Some(question);
                self.picked = None;
                self.state = SessionState::Ready;
            }
            Err(QuizError::EmptyPool) | Err(QuizError::InsufficientPool) => {
                self.question = None;
                self.state = SessionState::Empty;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.state = SessionState::Error;
            }
        }
    }

    // ==================== Answering ====================

    /// Pick the option at `index`. Valid only in Ready with a valid index;
    /// repicking before submit replaces the earlier pick.
    pub fn pick(&mut self, index: usize) -> bool {
        if self.state != SessionState::Ready {
            return false;
        }
        let Some(question) = &self.question else {
            return false;
        };
        if index >= question.option_count() {
            return false;
        }
        self.picked = Some(index);
        true
    }

    /// Grade the picked option: bump counters and, on a wrong answer, log a
    /// mistake record. Logging is best-effort; a storage failure there never
    /// undoes the score. Returns None unless in Ready with a pick made.
    pub fn submit(&mut self, conn: &Connection) -> Option<bool> {
        if self.state != SessionState::Ready {
            return None;
        }
        let question = self.question.clone()?;
        let picked = self.picked?;

        let correct = question.is_correct(picked);
        self.attempts += 1;
        if correct {
            self.score += 1;
        }
        self.state = SessionState::Answered;

        if !correct {
            self.log_mistake(conn, &question, picked);
        }
        Some(correct)
    }

    fn log_mistake(&self, conn: &Connection, question: &Question, picked: usize) {
        let Some(item) = self.pool.iter().find(|i| i.id() == question.answer_id) else {
            tracing::warn!("Answer item {} missing from pool snapshot", question.answer_id);
            return;
        };
        let correct_answer = question.answer().map(|o| o.text.as_str()).unwrap_or("");
        let picked_answer = question.option_label(picked).unwrap_or("");
        db::append_mistake(
            conn,
            item.id(),
            &question.prompt,
            correct_answer,
            picked_answer,
            item.level(),
            item.category(),
        )
        .log_warn("Failed to record mistake");
    }

    /// Advance to the next question. Valid only once graded; the previous
    /// answer item is excluded from the next draw where the pool allows.
    pub fn next(&mut self) -> bool {
        if self.state != SessionState::Answered {
            return false;
        }
        let previous = self.question.as_ref().map(|q| q.answer_id);
        self.present(previous);
        true
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn prompt_text(&self) -> Option<&str> {
        self.question.as_ref().map(|q| q.prompt.as_str())
    }

    pub fn picked(&self) -> Option<usize> {
        self.picked
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Default for DrillSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_mistakes, insert_item, list_mistakes};
    use crate::domain::{Category, Level};
    use crate::pool::LevelFilter;
    use crate::testing::TestEnv;

    fn word(text: &str, translation: &str) -> Item {
        Item::Word {
            id: 0,
            text: text.to_string(),
            reading: None,
            translation: translation.to_string(),
            level: Level::N3,
            category: Category::Vocabulary,
            daily_key: None,
        }
    }

    fn seeded_env(n: usize) -> TestEnv {
        let env = TestEnv::new().unwrap();
        for i in 0..n {
            insert_item(&env.conn, &word(&format!("語{}", i), &format!("word-{}", i))).unwrap();
        }
        env
    }

    fn criteria() -> PoolCriteria {
        PoolCriteria::new(LevelFilter::Exact(Level::N3), Some(Category::Vocabulary))
    }

    fn wrong_index(q: &Question) -> usize {
        (0..q.option_count()).find(|i| !q.is_correct(*i)).unwrap()
    }

    #[test]
    fn test_load_with_items_is_ready() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.pool_size(), 6);
        assert!(session.question().is_some());
    }

    #[test]
    fn test_load_empty_pool_is_empty_state() {
        let env = TestEnv::new().unwrap();
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.question().is_none());
    }

    #[test]
    fn test_storage_error_is_error_state() {
        let mut session = DrillSession::new();
        let token = session.begin_init();
        session.finish_init(token, Err(QuizError::StorageUnavailable("disk full".to_string())));
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.error_message().unwrap().contains("disk full"));
    }

    #[test]
    fn test_stale_init_discarded() {
        let mut session = DrillSession::new();
        let first = session.begin_init();
        let second = session.begin_init();

        let applied = session.finish_init(first, Ok(vec![word("古", "old")]));
        assert!(!applied);
        assert_eq!(session.state(), SessionState::Loading);

        let applied = session.finish_init(second, Ok(vec![word("新", "new"), word("語", "w")]));
        assert!(applied);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.pool_size(), 2);
    }

    #[test]
    fn test_correct_answer_scores() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let index = session.question().unwrap().answer_index().unwrap();
        assert!(session.pick(index));
        assert_eq!(session.submit(&env.conn), Some(true));
        assert_eq!(session.score(), 1);
        assert_eq!(session.attempts(), 1);
        assert_eq!(count_mistakes(&env.conn).unwrap(), 0);
    }

    #[test]
    fn test_wrong_answer_logs_mistake() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let index = wrong_index(session.question().unwrap());
        let prompt = session.prompt_text().unwrap().to_string();
        assert!(session.pick(index));
        assert_eq!(session.submit(&env.conn), Some(false));
        assert_eq!(session.score(), 0);
        assert_eq!(session.attempts(), 1);

        let mistakes = list_mistakes(&env.conn).unwrap();
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].prompt, prompt);
        assert_ne!(mistakes[0].correct_answer, mistakes[0].picked_answer);
    }

    #[test]
    fn test_double_submit_ignored() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let index = session.question().unwrap().answer_index().unwrap();
        session.pick(index);
        assert_eq!(session.submit(&env.conn), Some(true));
        assert_eq!(session.submit(&env.conn), None);
        assert_eq!(session.score(), 1);
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn test_pick_requires_ready_and_valid_index() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        assert!(!session.pick(0)); // still Loading

        session.load(&env.conn, &criteria());
        assert!(!session.pick(99));
        assert_eq!(session.state(), SessionState::Ready);

        assert!(session.pick(0));
        assert!(session.pick(1)); // repick before submit is allowed
        assert_eq!(session.picked(), Some(1));

        session.submit(&env.conn);
        assert!(!session.pick(0)); // graded, no more picking
    }

    #[test]
    fn test_submit_requires_a_pick() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());
        assert_eq!(session.submit(&env.conn), None);
        assert_eq!(session.attempts(), 0);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_next_advances_after_answer() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        assert!(!session.next()); // not answered yet
        session.pick(0);
        session.submit(&env.conn);
        assert!(session.next());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.picked(), None);
    }

    #[test]
    fn test_next_avoids_previous_answer() {
        let env = seeded_env(5);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let mut repeats = 0;
        for _ in 0..10 {
            let previous = session.question().unwrap().answer_id;
            session.pick(0);
            session.submit(&env.conn);
            session.next();
            if session.question().unwrap().answer_id == previous {
                repeats += 1;
            }
        }
        assert!(repeats <= 1, "answer repeated {} of 10 rounds", repeats);
    }

    #[test]
    fn test_score_equals_correct_picks_over_rounds() {
        let env = seeded_env(8);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let mut expected = 0;
        for round in 0..10 {
            let q = session.question().unwrap();
            let index = if round % 2 == 0 {
                expected += 1;
                q.answer_index().unwrap()
            } else {
                wrong_index(q)
            };
            session.pick(index);
            session.submit(&env.conn);
            session.next();
        }
        assert_eq!(session.score(), expected);
        assert_eq!(session.attempts(), 10);
        assert_eq!(count_mistakes(&env.conn).unwrap() as u32, 10 - expected);
    }

    #[test]
    fn test_empty_reload_resets_counters() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let index = session.question().unwrap().answer_index().unwrap();
        session.pick(index);
        session.submit(&env.conn);
        assert_eq!(session.score(), 1);

        // Nothing matches N1 reading; the new session starts from zero
        let unmatched =
            PoolCriteria::new(LevelFilter::Exact(Level::N1), Some(Category::Reading));
        session.load(&env.conn, &unmatched);
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.score(), 0);
        assert_eq!(session.attempts(), 0);
    }

    #[test]
    fn test_failed_reload_keeps_counters() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let index = session.question().unwrap().answer_index().unwrap();
        session.pick(index);
        session.submit(&env.conn);

        let token = session.begin_init();
        session.finish_init(token, Err(QuizError::StorageUnavailable("io".to_string())));
        assert_eq!(session.state(), SessionState::Error);
        assert_eq!(session.score(), 1);
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn test_reload_resets_counters() {
        let env = seeded_env(6);
        let mut session = DrillSession::new();
        session.load(&env.conn, &criteria());

        let index = session.question().unwrap().answer_index().unwrap();
        session.pick(index);
        session.submit(&env.conn);
        assert_eq!(session.score(), 1);

        session.load(&env.conn, &criteria());
        assert_eq!(session.score(), 0);
        assert_eq!(session.attempts(), 0);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_load_daily_key() {
        let env = TestEnv::new().unwrap();
        let key = crate::domain::daily_key(Level::N3, Category::Vocabulary, 1, 1);
        let mut item = word("毎日", "every day");
        if let Item::Word { daily_key, .. } = &mut item {
            *daily_key = Some(key.clone());
        }
        insert_item(&env.conn, &item).unwrap();

        let mut session = DrillSession::new();
        session.load_daily(&env.conn, &key);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.pool_size(), 1);
    }
}
