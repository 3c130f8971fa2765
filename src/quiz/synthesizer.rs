//! Question synthesis: one candidate pool in, one multiple-choice question out.
//!
//! Word/Sentence pools draw distractors from sibling items with a two-phase
//! fallback: same variant first, then any remaining item. Exam items bundle
//! their own choice list and only need shuffling.

use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;

use crate::config;
use crate::domain::{Item, Question, QuestionOption};
use crate::quiz::QuizError;

/// Synthesize a question from `pool`.
///
/// When `previous_answer` is supplied the answer item is resampled (bounded
/// retries) until its identity differs, unless the pool is too small to
/// guarantee that. Fails with `InsufficientPool` only on an empty pool;
/// undersized Word/Sentence pools degrade to fewer options instead.
pub fn synthesize(pool: &[Item], previous_answer: Option<i64>) -> Result<Question, QuizError> {
    if pool.is_empty() {
        return Err(QuizError::InsufficientPool);
    }

    let mut rng = rand::rng();
    let answer = pick_answer(pool, previous_answer, &mut rng);

    match answer {
        Item::Exam { .. } => exam_question(answer, &mut rng),
        Item::Word { .. } | Item::Sentence { .. } => {
            let mut options = translation_options(answer, pool, &mut rng);
            options.shuffle(&mut rng);
            Ok(Question {
                prompt: answer.prompt_text(),
                passage: None,
                options,
                answer_id: answer.id(),
            })
        }
    }
}

/// Uniform pick with bounded anti-repeat resampling.
fn pick_answer<'a>(pool: &'a [Item], previous: Option<i64>, rng: &mut ThreadRng) -> &'a Item {
    let mut pick = &pool[rng.random_range(0..pool.len())];

    if let Some(prev) = previous {
        if pool.len() > 1 {
            for _ in 0..config::ANTI_REPEAT_ATTEMPTS {
                if pick.id() != prev {
                    break;
                }
                pick = &pool[rng.random_range(0..pool.len())];
            }
        }
    }

    pick
}

/// Build the option set for a Word/Sentence answer.
///
/// Phase 1 prefers distractors of the same variant; phase 2 backfills from
/// the remaining pool. Texts are deduplicated so options stay pairwise
/// distinct; a pool smaller than 4 items yields fewer options, never an
/// error. Returned unshuffled, correct option first.
fn translation_options(answer: &Item, pool: &[Item], rng: &mut ThreadRng) -> Vec<QuestionOption> {
    let correct = answer.translation().unwrap_or_default().to_string();
    let needed = config::DISTRACTOR_COUNT;

    // --- Phase 1: Same variant (word vs sentence) ---
    let mut distractors: Vec<String> = pool
        .iter()
        .filter(|c| c.id() != answer.id() && c.kind_str() == answer.kind_str())
        .filter_map(|c| c.translation())
        .filter(|t| *t != correct)
        .map(|t| t.to_string())
        .collect();

    distractors.sort();
    distractors.dedup();
    distractors.shuffle(rng);

    // --- Phase 2: Any remaining item ---
    if distractors.len() < needed {
        let mut backfill: Vec<String> = pool
            .iter()
            .filter(|c| c.id() != answer.id() && c.kind_str() != answer.kind_str())
            .filter_map(|c| c.translation())
            .filter(|t| *t != correct && !distractors.iter().any(|d| d == t))
            .map(|t| t.to_string())
            .collect();

        backfill.sort();
        backfill.dedup();
        backfill.shuffle(rng);
        distractors.extend(backfill);
    }

    distractors.truncate(needed);

    let mut options = vec![QuestionOption {
        text: correct,
        is_correct: true,
        explanation: None,
    }];
    options.extend(distractors.into_iter().map(|text| QuestionOption {
        text,
        is_correct: false,
        explanation: None,
    }));

    options
}

/// Exam items carry their own choices; shuffle them for presentation.
fn exam_question(item: &Item, rng: &mut ThreadRng) -> Result<Question, QuizError> {
    let Item::Exam { prompt, passage, choices, .. } = item else {
        return Err(QuizError::InsufficientPool);
    };

    if choices.is_empty() {
        tracing::warn!("Exam item {} has no choices", item.id());
        return Err(QuizError::InsufficientPool);
    }

    let mut options: Vec<QuestionOption> = choices
        .iter()
        .map(|c| QuestionOption {
            text: c.text.clone(),
            is_correct: c.is_correct,
            explanation: c.explanation.clone(),
        })
        .collect();
    options.shuffle(rng);

    Ok(Question {
        prompt: prompt.clone(),
        passage: passage.clone(),
        options,
        answer_id: item.id(),
    })
}
