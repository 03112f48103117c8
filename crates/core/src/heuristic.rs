//! Offline answer scoring used when the AI backend is unavailable.

use crate::model::{AnswerEvaluation, EvaluationSource};

pub const BASE_SCORE: u32 = 60;
pub const LENGTH_BONUS: u32 = 10;
pub const KEYWORD_BONUS: u32 = 5;

/// Character counts past which an answer earns a length bonus.
pub const LENGTH_THRESHOLDS: [usize; 2] = [100, 200];

pub const TECHNICAL_KEYWORDS: [&str; 6] = [
    "component",
    "function",
    "database",
    "api",
    "react",
    "javascript",
];

const FEEDBACK: &str = "Answer received. AI evaluation temporarily unavailable.";
const SUGGESTED_ANSWER: &str =
    "A comprehensive answer would include technical details and specific examples.";

/// Score an answer by length and keyword presence.
///
/// Never fails; an empty answer still scores the base 60.
#[must_use]
pub fn evaluate(answer: &str) -> AnswerEvaluation {
    AnswerEvaluation {
        score: score(answer),
        feedback: FEEDBACK.to_string(),
        strengths: vec!["Provided a response".to_string()],
        improvements: vec![
            "Add more technical details".to_string(),
            "Include specific examples".to_string(),
        ],
        suggested_answer: SUGGESTED_ANSWER.to_string(),
        source: EvaluationSource::Heuristic,
    }
}

/// The numeric part of [`evaluate`].
#[must_use]
pub fn score(answer: &str) -> u8 {
    let length = answer.chars().count();
    let lowered = answer.to_lowercase();

    let length_bonus: u32 = LENGTH_THRESHOLDS
        .iter()
        .filter(|threshold| length > **threshold)
        .map(|_| LENGTH_BONUS)
        .sum();
    let keyword_bonus: u32 = TECHNICAL_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .map(|_| KEYWORD_BONUS)
        .sum();

    let total = (BASE_SCORE + length_bonus + keyword_bonus).min(100);
    u8::try_from(total).unwrap_or(100)
}
