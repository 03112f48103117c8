mod requests;
mod service;

pub use requests::{AnswerSubmission, RecordedAnswer, SessionListRequest, SessionUpdate};
pub use service::InterviewService;
