use serde::{Deserialize, Serialize};

/// One displayable answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// A synthesized multiple-choice question.
///
/// Immutable once built: the option order is the presentation order and
/// exactly one option is flagged correct. `answer_id` is the identity of the
/// item the correct option came from, used for anti-repeat on the next draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub passage: Option<String>,
    pub options: Vec<QuestionOption>,
    pub answer_id: i64,
}

impl Question {
    /// Index of the correct option in presentation order.
    pub fn answer_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_correct)
    }

    /// The correct option.
    pub fn answer(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// Display label for the option at `index`.
    pub fn option_label(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(|o| o.text.as_str())
    }

    /// Whether the option at `index` is the correct one.
    pub fn is_correct(&self, index: usize) -> bool {
        self.options.get(index).map(|o| o.is_correct).unwrap_or(false)
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}
