mod evaluator;
mod service;

pub use evaluator::{AiEvaluator, AnswerEvaluator, EvaluationRequest, HeuristicEvaluator};
pub use service::EvaluationService;
