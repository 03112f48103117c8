use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::catalog::{Difficulty, QuestionCategory};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("user answer cannot be empty")]
    EmptyAnswer,

    #[error("feedback cannot be empty")]
    EmptyFeedback,

    #[error("score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(i64),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question evaluation as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question_text: String,
    pub user_answer: String,
    pub score: i64,
    pub feedback: String,
    pub category: QuestionCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `QuestionEvaluation`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when a text field is blank or the score is outside `0..=100`.
    pub fn validate(self) -> Result<QuestionEvaluation, QuestionError> {
        QuestionEvaluation::new(
            self.question_text,
            self.user_answer,
            self.score,
            self.feedback,
            self.category,
            self.difficulty,
        )
    }
}

//
// ─── QUESTION EVALUATION ───────────────────────────────────────────────────────
//

/// One answered and scored question inside a session.
///
/// Fields are private: a constructed evaluation always carries a score in `0..=100`
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEvaluation {
    question_text: String,
    user_answer: String,
    score: u8,
    feedback: String,
    category: QuestionCategory,
    difficulty: Difficulty,
}

impl QuestionEvaluation {
    /// Build a scored question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when a text field is blank or the score is outside `0..=100`.
    pub fn new(
        question_text: impl Into<String>,
        user_answer: impl Into<String>,
        score: i64,
        feedback: impl Into<String>,
        category: QuestionCategory,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let question_text = question_text.into();
        let user_answer = user_answer.into();
        let feedback = feedback.into();

        if question_text.trim().is_empty() {
            return Err(QuestionError::EmptyQuestion);
        }
        if user_answer.trim().is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        if feedback.trim().is_empty() {
            return Err(QuestionError::EmptyFeedback);
        }
        let score = u8::try_from(score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or(QuestionError::ScoreOutOfRange(score))?;

        Ok(Self {
            question_text,
            user_answer,
            score,
            feedback,
            category,
            difficulty,
        })
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    #[must_use]
    pub fn user_answer(&self) -> &str {
        &self.user_answer
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    #[must_use]
    pub fn category(&self) -> QuestionCategory {
        self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(score: i64) -> QuestionDraft {
        QuestionDraft {
            question_text: "What is a closure?".into(),
            user_answer: "A function capturing its environment.".into(),
            score,
            feedback: "Good".into(),
            category: QuestionCategory::Technical,
            difficulty: Difficulty::Medium,
        }
    }

    #[test]
    fn accepts_score_bounds() {
        assert_eq!(draft(0).validate().unwrap().score(), 0);
        assert_eq!(draft(100).validate().unwrap().score(), 100);
    }

    #[test]
    fn rejects_out_of_range_scores() {
        assert_eq!(
            draft(101).validate().unwrap_err(),
            QuestionError::ScoreOutOfRange(101)
        );
        assert_eq!(
            draft(-1).validate().unwrap_err(),
            QuestionError::ScoreOutOfRange(-1)
        );
    }

    #[test]
    fn rejects_blank_answer() {
        let mut d = draft(50);
        d.user_answer = "   ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyAnswer);
    }

    #[test]
    fn draft_deserializes_with_default_difficulty() {
        let json = r#"{
            "questionText": "Q",
            "userAnswer": "A",
            "score": 70,
            "feedback": "ok",
            "category": "System Design"
        }"#;
        let d: QuestionDraft = serde_json::from_str(json).unwrap();
        assert_eq!(d.difficulty, Difficulty::Medium);
        assert_eq!(d.category, QuestionCategory::SystemDesign);
    }
}
