use std::sync::Arc;

use interview_core::model::{
    AnswerEvaluation, Difficulty, EvaluationSource, JobRole, QuestionSpec, QuestionType,
    SessionCategory,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use storage::repository::RoleRepository;

use super::client::TextGenerator;
use super::json::extract_json;
use super::prompts::{SYSTEM_INSTRUCTION, evaluation_prompt, question_prompt};
use crate::error::GatewayError;

const DEFAULT_TIME_LIMIT_SECS: u32 = 300;

/// Typed requests over a `TextGenerator`: builds prompts and parses the JSON replies.
#[derive(Clone)]
pub struct AiGateway {
    generator: Arc<dyn TextGenerator>,
    roles: Arc<dyn RoleRepository>,
}

impl AiGateway {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { generator, roles }
    }

    /// Ask the model for `count` interview questions.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the request fails, the reply holds no JSON,
    /// or the JSON does not describe any usable question.
    pub async fn generate_questions(
        &self,
        role: JobRole,
        category: SessionCategory,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<QuestionSpec>, GatewayError> {
        let guidance = self.role_guidance(role, category).await;
        let prompt = question_prompt(role, category, difficulty, count, guidance.as_deref());
        let reply = self.generator.complete(&prompt, SYSTEM_INSTRUCTION).await?;

        let payload: QuestionPayload = parse_reply(&reply)?;
        let questions: Vec<QuestionSpec> = payload
            .into_items()
            .into_iter()
            .filter_map(|raw| raw.into_spec(difficulty))
            .collect();
        if questions.is_empty() {
            return Err(GatewayError::Parse("reply contained no questions".into()));
        }
        Ok(questions)
    }

    /// Ask the model to score one answer.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the request fails, the reply holds no JSON,
    /// or the score is not a number in `0..=100`.
    pub async fn evaluate_answer(
        &self,
        question: &str,
        answer: &str,
        role: JobRole,
        category: SessionCategory,
    ) -> Result<AnswerEvaluation, GatewayError> {
        let prompt = evaluation_prompt(question, answer, role, category);
        let reply = self.generator.complete(&prompt, SYSTEM_INSTRUCTION).await?;
        let raw: RawEvaluation = parse_reply(&reply)?;
        raw.into_evaluation()
    }

    async fn role_guidance(&self, role: JobRole, category: SessionCategory) -> Option<String> {
        match self.roles.get_role(role.as_str()).await {
            Ok(definition) => definition
                .filter(|d| d.is_active)
                .and_then(|d| d.prompt_for(category.as_str()).map(str::to_string)),
            Err(err) => {
                tracing::warn!(role = %role, error = %err, "role catalogue lookup failed");
                None
            }
        }
    }
}

fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, GatewayError> {
    let json = extract_json(reply).ok_or(GatewayError::NoJsonFound)?;
    serde_json::from_str(json).map_err(|e| GatewayError::Parse(e.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionPayload {
    List(Vec<RawQuestion>),
    Wrapped { questions: Vec<RawQuestion> },
}

impl QuestionPayload {
    fn into_items(self) -> Vec<RawQuestion> {
        match self {
            QuestionPayload::List(items) | QuestionPayload::Wrapped { questions: items } => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    time_limit: Option<u32>,
    #[serde(default)]
    sample_answer: Option<String>,
}

impl RawQuestion {
    fn into_spec(self, requested: Difficulty) -> Option<QuestionSpec> {
        let question = self.question.trim().to_string();
        if question.is_empty() {
            return None;
        }
        let question_type = match self.kind.as_deref().map(str::to_ascii_lowercase) {
            Some(kind) if kind.starts_with("behav") => QuestionType::Behavioral,
            _ => QuestionType::Technical,
        };
        let difficulty = self
            .difficulty
            .and_then(|d| d.parse().ok())
            .unwrap_or(requested);
        Some(QuestionSpec {
            question,
            question_type,
            difficulty,
            time_limit: self
                .time_limit
                .filter(|t| *t > 0)
                .unwrap_or(DEFAULT_TIME_LIMIT_SECS),
            sample_answer: self.sample_answer.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvaluation {
    score: serde_json::Value,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    suggested_answer: String,
}

impl RawEvaluation {
    fn into_evaluation(self) -> Result<AnswerEvaluation, GatewayError> {
        let score = self
            .score
            .as_f64()
            .filter(|s| s.is_finite() && (0.0..=100.0).contains(s))
            .ok_or_else(|| GatewayError::Parse(format!("score out of range: {}", self.score)))?;
        if self.feedback.trim().is_empty() {
            return Err(GatewayError::Parse("missing feedback".into()));
        }
        // Range checked above, so the rounded value fits.
        let score = u8::try_from(interview_core::scoring::round_half_up(score))
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(AnswerEvaluation {
            score,
            feedback: self.feedback.trim().to_string(),
            strengths: self.strengths,
            improvements: self.improvements,
            suggested_answer: self.suggested_answer,
            source: EvaluationSource::Ai,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use interview_core::model::{RoleCategory, RoleDefinition};
    use std::sync::Mutex;
    use storage::repository::InMemoryRepository;

    struct Scripted {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn complete(
            &self,
            prompt: &str,
            system_instruction: &str,
        ) -> Result<String, GatewayError> {
            assert_eq!(system_instruction, SYSTEM_INSTRUCTION);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|()| GatewayError::Transport("connection refused".into()))
        }
    }

    fn gateway(generator: Arc<Scripted>) -> AiGateway {
        AiGateway::new(generator, Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn evaluation_reply_is_parsed_from_prose() {
        let generator = Scripted::replying(
            "Here is my evaluation:\n{\"score\": 85, \"feedback\": \"Solid\", \
             \"strengths\": [\"clear\"], \"improvements\": [], \"suggestedAnswer\": \"...\"}",
        );
        let evaluation = gateway(generator)
            .evaluate_answer("Q", "A", JobRole::FrontendDeveloper, SessionCategory::Technical)
            .await
            .unwrap();
        assert_eq!(evaluation.score, 85);
        assert_eq!(evaluation.strengths, ["clear"]);
        assert_eq!(evaluation.source, EvaluationSource::Ai);
    }

    #[tokio::test]
    async fn out_of_range_score_is_a_parse_error() {
        for reply in [
            r#"{"score": 120, "feedback": "x"}"#,
            r#"{"score": -1, "feedback": "x"}"#,
            r#"{"score": "high", "feedback": "x"}"#,
        ] {
            let err = gateway(Scripted::replying(reply))
                .evaluate_answer("Q", "A", JobRole::FrontendDeveloper, SessionCategory::Technical)
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::Parse(_)), "{reply}");
        }
    }

    #[tokio::test]
    async fn reply_without_json_is_reported() {
        let err = gateway(Scripted::replying("I'd rather not."))
            .evaluate_answer("Q", "A", JobRole::FrontendDeveloper, SessionCategory::Technical)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NoJsonFound));
    }

    #[tokio::test]
    async fn transport_failure_is_passed_through() {
        let generator = Arc::new(Scripted {
            reply: Err(()),
            prompts: Mutex::new(Vec::new()),
        });
        let err = gateway(generator)
            .evaluate_answer("Q", "A", JobRole::FrontendDeveloper, SessionCategory::Technical)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn questions_accept_bare_array_and_wrapped_object() {
        let bare = r#"[{"question": "Explain CAP", "type": "technical", "difficulty": "hard", "timeLimit": 600}]"#;
        let wrapped = r#"{"questions": [{"question": "Describe a conflict", "type": "Behavioral"}]}"#;

        let first = gateway(Scripted::replying(bare))
            .generate_questions(
                JobRole::BackendDeveloper,
                SessionCategory::SystemDesign,
                Difficulty::Medium,
                1,
            )
            .await
            .unwrap();
        assert_eq!(first[0].difficulty, Difficulty::Hard);
        assert_eq!(first[0].time_limit, 600);

        let second = gateway(Scripted::replying(wrapped))
            .generate_questions(
                JobRole::BackendDeveloper,
                SessionCategory::Behavioral,
                Difficulty::Easy,
                1,
            )
            .await
            .unwrap();
        assert_eq!(second[0].question_type, QuestionType::Behavioral);
        assert_eq!(second[0].difficulty, Difficulty::Easy);
        assert_eq!(second[0].time_limit, 300);
    }

    #[tokio::test]
    async fn empty_question_list_is_a_parse_error() {
        let err = gateway(Scripted::replying("[]"))
            .generate_questions(
                JobRole::BackendDeveloper,
                SessionCategory::Technical,
                Difficulty::Medium,
                3,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[tokio::test]
    async fn question_prompt_includes_role_guidance() {
        let roles = InMemoryRepository::new();
        roles
            .upsert_role(&RoleDefinition {
                name: "Backend Developer".into(),
                description: "APIs".into(),
                categories: vec![RoleCategory {
                    name: "technical".into(),
                    description: None,
                    ai_prompt: "Ask about idempotent retries".into(),
                }],
                is_active: true,
            })
            .await
            .unwrap();
        let generator = Scripted::replying(r#"[{"question": "Q1"}]"#);
        let gateway = AiGateway::new(generator.clone(), Arc::new(roles));

        gateway
            .generate_questions(
                JobRole::BackendDeveloper,
                SessionCategory::Technical,
                Difficulty::Medium,
                1,
            )
            .await
            .unwrap();
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Ask about idempotent retries"));
    }
}
