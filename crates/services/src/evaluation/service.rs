use std::sync::Arc;

use interview_core::model::{
    AnswerEvaluation, Difficulty, JobRole, QuestionSpec, SessionCategory,
};
use interview_core::question_bank::fallback_questions;

use super::evaluator::{AiEvaluator, AnswerEvaluator, EvaluationRequest, HeuristicEvaluator};
use crate::ai::AiGateway;

/// Scores answers and produces questions, preferring the AI provider and falling
/// back to deterministic local sources.
#[derive(Clone)]
pub struct EvaluationService {
    evaluators: Vec<Arc<dyn AnswerEvaluator>>,
    gateway: Option<AiGateway>,
}

impl EvaluationService {
    /// Build the default chain: AI (when configured), then the heuristic.
    #[must_use]
    pub fn new(gateway: Option<AiGateway>) -> Self {
        let mut evaluators: Vec<Arc<dyn AnswerEvaluator>> = Vec::new();
        if let Some(gateway) = &gateway {
            evaluators.push(Arc::new(AiEvaluator::new(gateway.clone())));
        }
        Self {
            evaluators,
            gateway,
        }
    }

    /// Heuristic scoring and the static question bank only.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Use a custom evaluator chain. The heuristic still runs last.
    #[must_use]
    pub fn with_evaluators(
        evaluators: Vec<Arc<dyn AnswerEvaluator>>,
        gateway: Option<AiGateway>,
    ) -> Self {
        Self {
            evaluators,
            gateway,
        }
    }

    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    /// Score one answer. The first evaluator that succeeds wins; when every
    /// configured evaluator fails the heuristic result is returned.
    pub async fn evaluate(
        &self,
        question: &str,
        answer: &str,
        role: JobRole,
        category: SessionCategory,
    ) -> AnswerEvaluation {
        let request = EvaluationRequest {
            question,
            answer,
            role,
            category,
        };

        for evaluator in &self.evaluators {
            match evaluator.evaluate(request).await {
                Ok(evaluation) => return evaluation,
                Err(err) => {
                    tracing::warn!(
                        evaluator = evaluator.name(),
                        error = %err,
                        "answer evaluation failed"
                    );
                }
            }
        }

        if !self.evaluators.is_empty() {
            tracing::info!("falling back to heuristic answer evaluation");
        }
        HeuristicEvaluator::score(request)
    }

    /// Produce up to `count` questions for the role and category.
    ///
    /// Falls back to the static bank when the AI provider is missing or fails;
    /// the bank yields an empty list for pairs it has no entries for.
    pub async fn generate_questions(
        &self,
        role: JobRole,
        category: SessionCategory,
        difficulty: Difficulty,
        count: usize,
    ) -> Vec<QuestionSpec> {
        if count == 0 {
            return Vec::new();
        }

        if let Some(gateway) = &self.gateway {
            match gateway
                .generate_questions(role, category, difficulty, count)
                .await
            {
                Ok(mut questions) => {
                    questions.truncate(count);
                    return questions;
                }
                Err(err) => {
                    tracing::warn!(role = %role, category = %category, error = %err, "question generation failed");
                    tracing::info!("falling back to the static question bank");
                }
            }
        }

        fallback_questions(role, category, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use interview_core::model::EvaluationSource;

    use crate::error::GatewayError;

    struct Fixed(u8);

    #[async_trait]
    impl AnswerEvaluator for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn evaluate(
            &self,
            _request: EvaluationRequest<'_>,
        ) -> Result<AnswerEvaluation, GatewayError> {
            Ok(AnswerEvaluation {
                score: self.0,
                feedback: "fixed".into(),
                strengths: Vec::new(),
                improvements: Vec::new(),
                suggested_answer: String::new(),
                source: EvaluationSource::Ai,
            })
        }
    }

    struct Broken;

    #[async_trait]
    impl AnswerEvaluator for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn evaluate(
            &self,
            _request: EvaluationRequest<'_>,
        ) -> Result<AnswerEvaluation, GatewayError> {
            Err(GatewayError::NoJsonFound)
        }
    }

    #[tokio::test]
    async fn offline_service_uses_heuristic() {
        let service = EvaluationService::offline();
        let evaluation = service
            .evaluate("Q", "", JobRole::FrontendDeveloper, SessionCategory::Technical)
            .await;
        assert_eq!(evaluation.score, 60);
        assert_eq!(evaluation.source, EvaluationSource::Heuristic);
        assert!(!service.ai_enabled());
    }

    #[tokio::test]
    async fn chain_skips_failures_and_stops_at_first_success() {
        let service = EvaluationService::with_evaluators(
            vec![Arc::new(Broken), Arc::new(Fixed(91)), Arc::new(Fixed(10))],
            None,
        );
        let evaluation = service
            .evaluate("Q", "A", JobRole::BackendDeveloper, SessionCategory::Technical)
            .await;
        assert_eq!(evaluation.score, 91);
    }

    #[tokio::test]
    async fn all_failures_end_in_heuristic() {
        let service = EvaluationService::with_evaluators(vec![Arc::new(Broken)], None);
        let evaluation = service
            .evaluate(
                "Q",
                "I built a react component that calls an api",
                JobRole::FrontendDeveloper,
                SessionCategory::Technical,
            )
            .await;
        assert_eq!(evaluation.source, EvaluationSource::Heuristic);
        assert_eq!(evaluation.score, 75);
    }

    #[tokio::test]
    async fn offline_questions_come_from_the_bank() {
        let service = EvaluationService::offline();
        let questions = service
            .generate_questions(
                JobRole::FrontendDeveloper,
                SessionCategory::Technical,
                Difficulty::Medium,
                5,
            )
            .await;
        assert_eq!(questions.len(), 2);

        let none = service
            .generate_questions(
                JobRole::ProductManager,
                SessionCategory::Dsa,
                Difficulty::Medium,
                5,
            )
            .await;
        assert!(none.is_empty());

        let zero = service
            .generate_questions(
                JobRole::FrontendDeveloper,
                SessionCategory::Technical,
                Difficulty::Medium,
                0,
            )
            .await;
        assert!(zero.is_empty());
    }
}
