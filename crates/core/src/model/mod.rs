mod activity;
mod catalog;
mod evaluation;
mod ids;
mod question;
mod role;
mod session;

pub use activity::{ActivityAction, ActivityDetails, ActivityRecord, NewActivity};
pub use catalog::{Difficulty, JobRole, ParseCatalogError, QuestionCategory, SessionCategory};
pub use evaluation::{AnswerEvaluation, EvaluationSource, QuestionSpec, QuestionType};
pub use ids::{ParseIdError, SessionId, UserId};
pub use question::{QuestionDraft, QuestionError, QuestionEvaluation};
pub use role::{RoleCategory, RoleDefinition, RoleError};
pub use session::{
    DURATION_RANGE_MINUTES, InterviewSession, SessionDraft, SessionDraftError, SessionInsights,
    SessionStatus, ValidatedSession, normalize_tags, validate_questions,
};
