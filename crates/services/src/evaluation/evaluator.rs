use async_trait::async_trait;
use interview_core::heuristic;
use interview_core::model::{AnswerEvaluation, JobRole, SessionCategory};

use crate::ai::AiGateway;
use crate::error::GatewayError;

/// One answer to be scored, with the context the evaluators need.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub role: JobRole,
    pub category: SessionCategory,
}

/// A single scoring strategy in the evaluation chain.
#[async_trait]
pub trait AnswerEvaluator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Score the answer.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when this strategy cannot produce a result; the chain
    /// moves on to the next evaluator.
    async fn evaluate(
        &self,
        request: EvaluationRequest<'_>,
    ) -> Result<AnswerEvaluation, GatewayError>;
}

/// Scores answers through the AI gateway.
#[derive(Clone)]
pub struct AiEvaluator {
    gateway: AiGateway,
}

impl AiEvaluator {
    #[must_use]
    pub fn new(gateway: AiGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AnswerEvaluator for AiEvaluator {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn evaluate(
        &self,
        request: EvaluationRequest<'_>,
    ) -> Result<AnswerEvaluation, GatewayError> {
        self.gateway
            .evaluate_answer(
                request.question,
                request.answer,
                request.role,
                request.category,
            )
            .await
    }
}

/// Length and keyword scoring. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    #[must_use]
    pub fn score(request: EvaluationRequest<'_>) -> AnswerEvaluation {
        heuristic::evaluate(request.answer)
    }
}

#[async_trait]
impl AnswerEvaluator for HeuristicEvaluator {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn evaluate(
        &self,
        request: EvaluationRequest<'_>,
    ) -> Result<AnswerEvaluation, GatewayError> {
        Ok(Self::score(request))
    }
}
