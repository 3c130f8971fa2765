pub mod item;
pub mod question;

pub use item::{Category, ExamChoice, Item, Level, daily_key};
pub use question::{Question, QuestionOption};
