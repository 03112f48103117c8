//! Shared error types for the services crate.

use thiserror::Error;

use interview_core::model::{QuestionError, RoleError, SessionDraftError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the AI gateway. Always recoverable: callers fall back.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("AI request failed: {0}")]
    Transport(String),
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("AI response contained no JSON")]
    NoJsonFound,
    #[error("AI response could not be parsed: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Errors emitted by `InterviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InterviewError {
    #[error("interview session not found")]
    NotFound,
    #[error("interview session belongs to another user")]
    Unauthorized,
    #[error(transparent)]
    Draft(#[from] SessionDraftError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AnalyticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyticsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ActivityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActivityError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RoleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoleServiceError {
    #[error(transparent)]
    Role(#[from] RoleError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
