use interview_core::model::{
    AnswerEvaluation, Difficulty, InterviewSession, JobRole, QuestionCategory, QuestionDraft,
    SessionCategory, SessionStatus,
};
use serde::{Deserialize, Serialize};
use storage::query::SessionSort;

use crate::paging::PageRequest;

/// Listing parameters for one user's sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionListRequest {
    pub role: Option<JobRole>,
    pub category: Option<SessionCategory>,
    pub status: Option<SessionStatus>,
    pub search: Option<String>,
    pub sort: SessionSort,
    pub page: PageRequest,
}

/// Partial update of a session. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(default)]
    pub questions: Option<Vec<QuestionDraft>>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl SessionUpdate {
    #[must_use]
    pub fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.questions.is_some() {
            fields.push("questions");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.tags.is_some() {
            fields.push("tags");
        }
        fields
    }
}

/// An answer to append to a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_text: String,
    pub answer: String,
    /// Defaults to the session's own category.
    #[serde(default)]
    pub category: Option<QuestionCategory>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// The stored session after an answer was appended, with the evaluation used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAnswer {
    pub session: InterviewSession,
    pub evaluation: AnswerEvaluation,
}
