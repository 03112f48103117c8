use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::catalog::{JobRole, ParseCatalogError, SessionCategory};
use crate::model::ids::{SessionId, UserId};
use crate::model::question::{QuestionDraft, QuestionError, QuestionEvaluation};
use crate::scoring::aggregate_score;

/// Allowed session length in minutes.
pub const DURATION_RANGE_MINUTES: std::ops::RangeInclusive<u32> = 15..=180;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionDraftError {
    #[error("duration must be between 15 and 180 minutes, got {0}")]
    InvalidDuration(u32),

    #[error("total score must be between 0 and 100, got {0}")]
    TotalScoreOutOfRange(i64),

    #[error("question {index}: {source}")]
    Question {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in-progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "abandoned" => Ok(SessionStatus::Abandoned),
            _ => Err(ParseCatalogError::new("status", s)),
        }
    }
}

//
// ─── INSIGHTS ──────────────────────────────────────────────────────────────────
//

/// Qualitative summary attached when a session completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInsights {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub overall_feedback: String,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Caller input for a new session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub role: JobRole,
    pub category: SessionCategory,
    pub duration: u32,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub total_score: Option<i64>,
}

impl SessionDraft {
    #[must_use]
    pub fn new(role: JobRole, category: SessionCategory, duration: u32) -> Self {
        Self {
            role,
            category,
            duration,
            questions: Vec::new(),
            tags: Vec::new(),
            total_score: None,
        }
    }

    /// Validate the draft for the given owner.
    ///
    /// # Errors
    ///
    /// Returns `SessionDraftError` when the duration, the caller-supplied total score
    /// or any question is invalid.
    pub fn validate(
        self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<ValidatedSession, SessionDraftError> {
        if !DURATION_RANGE_MINUTES.contains(&self.duration) {
            return Err(SessionDraftError::InvalidDuration(self.duration));
        }
        let raw_total = self.total_score.unwrap_or(0);
        let total_score = validate_total_score(raw_total)?;
        let questions = validate_questions(self.questions)?;

        let total_score = aggregate_score(&questions).unwrap_or(total_score);

        Ok(ValidatedSession {
            user_id,
            role: self.role,
            category: self.category,
            duration: self.duration,
            questions,
            total_score,
            tags: normalize_tags(self.tags),
            created_at: now,
        })
    }
}

/// Validate a batch of question drafts, reporting the first failing index.
///
/// # Errors
///
/// Returns `SessionDraftError::Question` for the first invalid draft.
pub fn validate_questions(
    drafts: Vec<QuestionDraft>,
) -> Result<Vec<QuestionEvaluation>, SessionDraftError> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map_err(|source| SessionDraftError::Question { index, source })
        })
        .collect()
}

fn validate_total_score(raw: i64) -> Result<u8, SessionDraftError> {
    u8::try_from(raw)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or(SessionDraftError::TotalScoreOutOfRange(raw))
}

/// Trim, drop blanks and de-duplicate while keeping first-seen order.
#[must_use]
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || out.iter().any(|t| t == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// A validated session that has not been assigned a storage id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSession {
    pub user_id: UserId,
    pub role: JobRole,
    pub category: SessionCategory,
    pub duration: u32,
    pub questions: Vec<QuestionEvaluation>,
    pub total_score: u8,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ValidatedSession {
    #[must_use]
    pub fn assign_id(self, id: SessionId) -> InterviewSession {
        InterviewSession {
            id,
            user_id: self.user_id,
            role: self.role,
            category: self.category,
            status: SessionStatus::InProgress,
            duration: self.duration,
            questions: self.questions,
            total_score: self.total_score,
            insights: None,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One interview practice attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    id: SessionId,
    user_id: UserId,
    role: JobRole,
    category: SessionCategory,
    status: SessionStatus,
    duration: u32,
    questions: Vec<QuestionEvaluation>,
    total_score: u8,
    insights: Option<SessionInsights>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InterviewSession {
    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionDraftError::TotalScoreOutOfRange` if the stored score is invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        user_id: UserId,
        role: JobRole,
        category: SessionCategory,
        status: SessionStatus,
        duration: u32,
        questions: Vec<QuestionEvaluation>,
        total_score: i64,
        insights: Option<SessionInsights>,
        tags: Vec<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, SessionDraftError> {
        Ok(Self {
            id,
            user_id,
            role,
            category,
            status,
            duration,
            questions,
            total_score: validate_total_score(total_score)?,
            insights,
            tags,
            created_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn role(&self) -> JobRole {
        self.role
    }

    #[must_use]
    pub fn category(&self) -> SessionCategory {
        self.category
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionEvaluation] {
        &self.questions
    }

    #[must_use]
    pub fn total_score(&self) -> u8 {
        self.total_score
    }

    #[must_use]
    pub fn insights(&self) -> Option<&SessionInsights> {
        self.insights.as_ref()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Replace the full question list. Callers must rescore before persisting.
    pub fn replace_questions(&mut self, questions: Vec<QuestionEvaluation>) {
        self.questions = questions;
    }

    /// Append one scored question. Callers must rescore before persisting.
    pub fn push_question(&mut self, question: QuestionEvaluation) {
        self.questions.push(question);
    }

    /// Set the status and return the previous one.
    pub fn set_status(&mut self, status: SessionStatus) -> SessionStatus {
        std::mem::replace(&mut self.status, status)
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = normalize_tags(tags);
    }

    pub fn attach_insights(&mut self, insights: SessionInsights) {
        self.insights = Some(insights);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub(crate) fn set_total_score(&mut self, score: u8) {
        self.total_score = score;
    }
}
