//! Question synthesis and drill session control.

mod session;
mod synthesizer;

pub use session::{DrillSession, SessionState};
pub use synthesizer::synthesize;

use crate::db::DbLockError;

/// Errors surfaced by pool filtering, question synthesis and session control.
///
/// All variants are recoverable: they are mapped to session states (Empty,
/// Error) or discarded (StaleGeneration) at the session boundary rather than
/// propagated as faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// Filter criteria matched nothing
    EmptyPool,
    /// Pool too small to synthesize a question
    InsufficientPool,
    /// Underlying persistence failed; prior in-memory state is untouched
    StorageUnavailable(String),
    /// Result of a superseded init/reload; discard silently
    StaleGeneration,
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::EmptyPool => write!(f, "No items match the selected criteria"),
            QuizError::InsufficientPool => {
                write!(f, "Not enough items to build a question")
            }
            QuizError::StorageUnavailable(e) => write!(f, "Storage unavailable: {}", e),
            QuizError::StaleGeneration => write!(f, "Superseded by a newer request"),
        }
    }
}

impl std::error::Error for QuizError {}

impl From<rusqlite::Error> for QuizError {
    fn from(e: rusqlite::Error) -> Self {
        QuizError::StorageUnavailable(e.to_string())
    }
}

impl From<DbLockError> for QuizError {
    fn from(e: DbLockError) -> Self {
        QuizError::StorageUnavailable(e.to_string())
    }
}
