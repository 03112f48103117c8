//! Session score aggregation.
//!
//! A session's `total_score` is the half-up rounded mean of its question scores
//! whenever it has questions. Every write path that can change the question list
//! runs [`recompute_score`] before persisting.

use crate::model::{InterviewSession, QuestionEvaluation};

/// Round half-up, matching how presentation scores are computed everywhere.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Arithmetic mean, `None` for an empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut count = 0_usize;
    for v in values {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Mean question score as an unrounded float.
#[must_use]
pub fn mean_question_score(questions: &[QuestionEvaluation]) -> Option<f64> {
    mean(questions.iter().map(|q| f64::from(q.score())))
}

/// Rounded mean of the question scores, `None` when there are no questions.
#[must_use]
pub fn aggregate_score(questions: &[QuestionEvaluation]) -> Option<u8> {
    debug_assert!(
        questions.iter().all(|q| q.score() <= 100),
        "question scores are validated to 0..=100 at construction"
    );
    let mean = mean_question_score(questions)?;
    // The mean of values in 0..=100 rounds into 0..=100.
    u8::try_from(round_half_up(mean)).ok()
}

/// Recompute `total_score` from the question list.
///
/// Leaves the score untouched when the session has no questions.
#[must_use]
pub fn recompute_score(mut session: InterviewSession) -> InterviewSession {
    if let Some(score) = aggregate_score(session.questions()) {
        session.set_total_score(score);
    }
    session
}
