use serde::{Deserialize, Serialize};

/// JLPT proficiency level, ordered easiest (N5) to hardest (N1).
/// `Daily` is the pseudo-level used for the fixed daily-practice item sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    N5,
    N4,
    N3,
    N2,
    N1,
    Daily,
}

impl Level {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "n5" | "N5" => Some(Self::N5),
            "n4" | "N4" => Some(Self::N4),
            "n3" | "N3" => Some(Self::N3),
            "n2" | "N2" => Some(Self::N2),
            "n1" | "N1" => Some(Self::N1),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N5 => "n5",
            Self::N4 => "n4",
            Self::N3 => "n3",
            Self::N2 => "n2",
            Self::N1 => "n1",
            Self::Daily => "daily",
        }
    }
}

/// Practice category within a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Grammar,
    Vocabulary,
    Reading,
    Listening,
}

impl Category {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "grammar" => Some(Self::Grammar),
            "vocabulary" => Some(Self::Vocabulary),
            "reading" => Some(Self::Reading),
            "listening" => Some(Self::Listening),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::Vocabulary => "vocabulary",
            Self::Reading => "reading",
            Self::Listening => "listening",
        }
    }
}

/// One answer choice bundled with an exam question.
/// Exactly one choice per question carries `is_correct` (validated on load).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamChoice {
    pub text: String,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A unit of practice content.
///
/// Word and Sentence items carry a single canonical translation that serves
/// both as the correct-answer text and as the distractor text pool for
/// sibling items. Exam items bundle their own choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Word {
        id: i64,
        text: String,
        reading: Option<String>,
        translation: String,
        level: Level,
        category: Category,
        daily_key: Option<String>,
    },
    Sentence {
        id: i64,
        text: String,
        translation: String,
        level: Level,
        category: Category,
        daily_key: Option<String>,
    },
    Exam {
        id: i64,
        year: u16,
        session: u16,
        number: u16,
        prompt: String,
        passage: Option<String>,
        choices: Vec<ExamChoice>,
        level: Level,
        category: Category,
        daily_key: Option<String>,
    },
}

impl Item {
    /// Store-assigned identity. Zero until inserted.
    pub fn id(&self) -> i64 {
        match self {
            Item::Word { id, .. } | Item::Sentence { id, .. } | Item::Exam { id, .. } => *id,
        }
    }

    pub fn set_id(&mut self, new_id: i64) {
        match self {
            Item::Word { id, .. } | Item::Sentence { id, .. } | Item::Exam { id, .. } => *id = new_id,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Item::Word { level, .. } | Item::Sentence { level, .. } | Item::Exam { level, .. } => *level,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Item::Word { category, .. }
            | Item::Sentence { category, .. }
            | Item::Exam { category, .. } => *category,
        }
    }

    pub fn daily_key(&self) -> Option<&str> {
        match self {
            Item::Word { daily_key, .. }
            | Item::Sentence { daily_key, .. }
            | Item::Exam { daily_key, .. } => daily_key.as_deref(),
        }
    }

    /// Kind discriminant as stored in the `items.kind` column.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Item::Word { .. } => "word",
            Item::Sentence { .. } => "sentence",
            Item::Exam { .. } => "exam",
        }
    }

    /// Canonical translation for Word/Sentence items; None for exam items.
    pub fn translation(&self) -> Option<&str> {
        match self {
            Item::Word { translation, .. } | Item::Sentence { translation, .. } => Some(translation),
            Item::Exam { .. } => None,
        }
    }

    /// Prompt as presented to the user: word text with its reading annotation
    /// when present, sentence text alone, or the exam question stem.
    pub fn prompt_text(&self) -> String {
        match self {
            Item::Word { text, reading, .. } => match reading {
                Some(r) => format!("{}（{}）", text, r),
                None => text.clone(),
            },
            Item::Sentence { text, .. } => text.clone(),
            Item::Exam { prompt, .. } => prompt.clone(),
        }
    }
}

/// Deterministic lookup key for a daily practice set.
pub fn daily_key(level: Level, category: Category, week: u8, day: u8) -> String {
    format!("{}:{}:w{}:d{}", level.as_str(), category.as_str(), week, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: i64, text: &str, reading: Option<&str>, translation: &str) -> Item {
        Item::Word {
            id,
            text: text.to_string(),
            reading: reading.map(|s| s.to_string()),
            translation: translation.to_string(),
            level: Level::N3,
            category: Category::Vocabulary,
            daily_key: None,
        }
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!(Level::from_str("n5"), Some(Level::N5));
        assert_eq!(Level::from_str("N1"), Some(Level::N1));
        assert_eq!(Level::from_str("daily"), Some(Level::Daily));
        assert_eq!(Level::from_str("n6"), None);
        assert_eq!(Level::from_str(""), None);
    }

    #[test]
    fn test_level_as_str_roundtrip() {
        let levels = [Level::N5, Level::N4, Level::N3, Level::N2, Level::N1, Level::Daily];
        for lv in levels {
            assert_eq!(Level::from_str(lv.as_str()), Some(lv));
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(Category::from_str("grammar"), Some(Category::Grammar));
        assert_eq!(Category::from_str("vocabulary"), Some(Category::Vocabulary));
        assert_eq!(Category::from_str("reading"), Some(Category::Reading));
        assert_eq!(Category::from_str("listening"), Some(Category::Listening));
        assert_eq!(Category::from_str("Grammar"), None);
        assert_eq!(Category::from_str(""), None);
    }

    #[test]
    fn test_category_as_str_roundtrip() {
        let cats = [
            Category::Grammar,
            Category::Vocabulary,
            Category::Reading,
            Category::Listening,
        ];
        for cat in cats {
            assert_eq!(Category::from_str(cat.as_str()), Some(cat));
        }
    }

    #[test]
    fn test_word_prompt_includes_reading() {
        let item = word(1, "勉強", Some("べんきょう"), "study");
        assert_eq!(item.prompt_text(), "勉強（べんきょう）");
    }

    #[test]
    fn test_word_prompt_without_reading() {
        let item = word(1, "勉強", None, "study");
        assert_eq!(item.prompt_text(), "勉強");
    }

    #[test]
    fn test_sentence_prompt_is_text_alone() {
        let item = Item::Sentence {
            id: 2,
            text: "今日は天気がいいです。".to_string(),
            translation: "The weather is nice today.".to_string(),
            level: Level::N4,
            category: Category::Grammar,
            daily_key: None,
        };
        assert_eq!(item.prompt_text(), "今日は天気がいいです。");
    }

    #[test]
    fn test_item_accessors() {
        let item = word(7, "水", Some("みず"), "water");
        assert_eq!(item.id(), 7);
        assert_eq!(item.level(), Level::N3);
        assert_eq!(item.category(), Category::Vocabulary);
        assert_eq!(item.kind_str(), "word");
        assert_eq!(item.translation(), Some("water"));
        assert!(item.daily_key().is_none());
    }

    #[test]
    fn test_exam_has_no_translation() {
        let item = Item::Exam {
            id: 3,
            year: 2019,
            session: 2,
            number: 14,
            prompt: "（　）に何を入れますか。".to_string(),
            passage: None,
            choices: vec![],
            level: Level::N2,
            category: Category::Grammar,
            daily_key: None,
        };
        assert!(item.translation().is_none());
        assert_eq!(item.kind_str(), "exam");
    }

    #[test]
    fn test_set_id() {
        let mut item = word(0, "火", None, "fire");
        item.set_id(42);
        assert_eq!(item.id(), 42);
    }

    #[test]
    fn test_daily_key_format() {
        assert_eq!(
            daily_key(Level::N3, Category::Grammar, 2, 5),
            "n3:grammar:w2:d5"
        );
        assert_eq!(
            daily_key(Level::Daily, Category::Listening, 10, 7),
            "daily:listening:w10:d7"
        );
    }

    #[test]
    fn test_daily_keys_are_distinct() {
        let a = daily_key(Level::N3, Category::Grammar, 1, 2);
        let b = daily_key(Level::N3, Category::Grammar, 2, 1);
        assert_ne!(a, b);
    }
}
