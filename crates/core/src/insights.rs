//! Natural-language insights for a single session and for a user's history.

use crate::model::{QuestionCategory, QuestionEvaluation, SessionCategory, SessionInsights};
use crate::scoring::{mean, mean_question_score};

pub const STRENGTH_THRESHOLD: f64 = 80.0;
pub const WEAKNESS_THRESHOLD: f64 = 60.0;
pub const RECOMMENDATION_THRESHOLD: f64 = 70.0;

/// Total session count, any status, at which the consistency remark appears.
pub const CONSISTENCY_MIN_INTERVIEWS: usize = 5;

/// Spread between best and worst completed score that counts as inconsistent.
pub const VARIANCE_THRESHOLD: u8 = 30;

pub const FIRST_INTERVIEW_PROMPT: &str =
    "Start your first interview practice to begin tracking your progress!";

//
// ─── SESSION MODE ──────────────────────────────────────────────────────────────
//

/// Summarize one session's answered questions.
///
/// Categories are reported in first-seen order. An empty question list yields the
/// low-tier feedback with no strengths or weaknesses.
#[must_use]
pub fn summarize(questions: &[QuestionEvaluation]) -> SessionInsights {
    let mut groups: Vec<(QuestionCategory, Vec<f64>)> = Vec::new();
    for question in questions {
        let score = f64::from(question.score());
        match groups.iter_mut().find(|(c, _)| *c == question.category()) {
            Some((_, scores)) => scores.push(score),
            None => groups.push((question.category(), vec![score])),
        }
    }

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for (category, scores) in groups {
        let Some(avg) = mean(scores) else { continue };
        if avg >= STRENGTH_THRESHOLD {
            strengths.push(format!("Strong performance in {category}"));
        } else if avg < WEAKNESS_THRESHOLD {
            weaknesses.push(format!("Needs improvement in {category}"));
        }
    }

    let overall = mean_question_score(questions).unwrap_or(0.0);
    let tier_tip = if overall >= RECOMMENDATION_THRESHOLD {
        "Continue practicing to maintain your performance"
    } else {
        "Focus on weak areas and practice more questions"
    };
    let overall_feedback = if overall >= STRENGTH_THRESHOLD {
        "Excellent performance! You demonstrate strong interview skills."
    } else if overall >= WEAKNESS_THRESHOLD {
        "Good performance with room for improvement."
    } else {
        "Keep practicing! Focus on understanding core concepts."
    };

    SessionInsights {
        strengths,
        weaknesses,
        recommendations: vec![
            tier_tip.to_string(),
            "Review feedback for each question to understand areas of improvement".to_string(),
            "Consider practicing with a timer to improve time management".to_string(),
        ],
        overall_feedback: overall_feedback.to_string(),
    }
}

//
// ─── HISTORY MODE ──────────────────────────────────────────────────────────────
//

/// What the history insights need to know about a user's sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryInput {
    /// All sessions, whatever their status.
    pub total_interviews: usize,
    /// Mean `total_score` of completed sessions; `None` when none are completed.
    pub average_score: Option<f64>,
    /// `(max, min)` of completed sessions' `total_score`.
    pub score_range: Option<(u8, u8)>,
    pub best_category: Option<SessionCategory>,
    pub weak_categories: Vec<SessionCategory>,
}

/// Build the ordered list of history remarks.
#[must_use]
pub fn generate_insights(input: &HistoryInput) -> Vec<String> {
    if input.total_interviews == 0 {
        return vec![FIRST_INTERVIEW_PROMPT.to_string()];
    }

    let mut insights = Vec::new();

    // No completed sessions reads as an average of zero.
    let average = input.average_score.unwrap_or(0.0);
    let tier = if average >= STRENGTH_THRESHOLD {
        "Excellent performance! You consistently score high in interviews."
    } else if average >= WEAKNESS_THRESHOLD {
        "Good performance with room for improvement. Keep practicing!"
    } else {
        "Focus on understanding core concepts and practice more questions."
    };
    insights.push(tier.to_string());

    if let Some(best) = input.best_category {
        insights.push(format!("You perform best in {best} interviews."));
    }

    if !input.weak_categories.is_empty() {
        let names: Vec<&str> = input.weak_categories.iter().map(|c| c.as_str()).collect();
        insights.push(format!("Consider focusing more on: {}", names.join(", ")));
    }

    if input.total_interviews >= CONSISTENCY_MIN_INTERVIEWS {
        insights.push(format!(
            "Great consistency! You've completed {} interviews.",
            input.total_interviews
        ));
    }

    if let Some((max, min)) = input.score_range {
        if max.saturating_sub(min) > VARIANCE_THRESHOLD {
            insights.push(
                "Your performance varies significantly. Work on consistency across different topics."
                    .to_string(),
            );
        }
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn q(category: QuestionCategory, score: i64) -> QuestionEvaluation {
        QuestionEvaluation::new("Q", "A", score, "F", category, Difficulty::Medium).unwrap()
    }

    #[test]
    fn category_mean_of_exactly_80_is_a_strength() {
        let insights = summarize(&[
            q(QuestionCategory::Technical, 75),
            q(QuestionCategory::Technical, 85),
        ]);
        assert_eq!(insights.strengths, ["Strong performance in Technical"]);
        assert!(insights.weaknesses.is_empty());
        assert_eq!(
            insights.overall_feedback,
            "Excellent performance! You demonstrate strong interview skills."
        );
    }

    #[test]
    fn weak_and_strong_categories_keep_first_seen_order() {
        let insights = summarize(&[
            q(QuestionCategory::SystemDesign, 50),
            q(QuestionCategory::Behavioral, 90),
            q(QuestionCategory::Dsa, 40),
            q(QuestionCategory::SystemDesign, 55),
        ]);
        assert_eq!(insights.strengths, ["Strong performance in Behavioral"]);
        assert_eq!(
            insights.weaknesses,
            [
                "Needs improvement in System Design",
                "Needs improvement in DSA"
            ]
        );
        // Mean 58.75
        assert_eq!(
            insights.overall_feedback,
            "Keep practicing! Focus on understanding core concepts."
        );
        assert_eq!(
            insights.recommendations[0],
            "Focus on weak areas and practice more questions"
        );
    }

    #[test]
    fn mid_tier_session() {
        let insights = summarize(&[q(QuestionCategory::General, 70)]);
        assert!(insights.strengths.is_empty());
        assert!(insights.weaknesses.is_empty());
        assert_eq!(
            insights.overall_feedback,
            "Good performance with room for improvement."
        );
        assert_eq!(insights.recommendations.len(), 3);
        assert_eq!(
            insights.recommendations[0],
            "Continue practicing to maintain your performance"
        );
    }

    #[test]
    fn no_history_yields_single_prompt() {
        let insights = generate_insights(&HistoryInput::default());
        assert_eq!(insights, [FIRST_INTERVIEW_PROMPT]);
    }

    #[test]
    fn full_history_remarks_in_order() {
        let input = HistoryInput {
            total_interviews: 6,
            average_score: Some(72.4),
            score_range: Some((95, 40)),
            best_category: Some(SessionCategory::Behavioral),
            weak_categories: vec![SessionCategory::SystemDesign, SessionCategory::Dsa],
        };
        assert_eq!(
            generate_insights(&input),
            [
                "Good performance with room for improvement. Keep practicing!",
                "You perform best in Behavioral interviews.",
                "Consider focusing more on: System Design, DSA",
                "Great consistency! You've completed 6 interviews.",
                "Your performance varies significantly. Work on consistency across different topics.",
            ]
        );
    }

    #[test]
    fn variance_boundary_is_strict() {
        let mut input = HistoryInput {
            total_interviews: 2,
            average_score: Some(85.0),
            score_range: Some((100, 70)),
            best_category: None,
            weak_categories: Vec::new(),
        };
        assert_eq!(generate_insights(&input).len(), 1);

        input.score_range = Some((100, 69));
        assert_eq!(generate_insights(&input).len(), 2);
    }

    #[test]
    fn consistency_needs_five_interviews() {
        let mut input = HistoryInput {
            total_interviews: 4,
            ..HistoryInput::default()
        };
        assert!(!generate_insights(&input)
            .iter()
            .any(|s| s.starts_with("Great consistency")));

        input.total_interviews = 5;
        assert!(generate_insights(&input)
            .iter()
            .any(|s| s == "Great consistency! You've completed 5 interviews."));
    }

    #[test]
    fn sessions_without_completions_read_as_low_tier() {
        let input = HistoryInput {
            total_interviews: 2,
            ..HistoryInput::default()
        };
        assert_eq!(
            generate_insights(&input),
            ["Focus on understanding core concepts and practice more questions."]
        );
    }
}
