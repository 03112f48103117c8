use std::sync::Arc;

use interview_core::insights::summarize;
use interview_core::model::{
    ActivityAction, InterviewSession, NewActivity, QuestionCategory, QuestionError,
    QuestionEvaluation, SessionDraft, SessionId, SessionStatus, UserId, validate_questions,
};
use interview_core::scoring::recompute_score;
use storage::query::{SessionFilter, SessionQuery};
use storage::repository::{ActivityRepository, SessionRepository, StorageError};

use super::requests::{AnswerSubmission, RecordedAnswer, SessionListRequest, SessionUpdate};
use crate::Clock;
use crate::error::InterviewError;
use crate::evaluation::EvaluationService;
use crate::paging::Page;

/// Create, read, update and delete interview sessions, keeping the activity log
/// and the session score in step with every write.
#[derive(Clone)]
pub struct InterviewService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    activities: Arc<dyn ActivityRepository>,
    evaluation: Arc<EvaluationService>,
}

impl InterviewService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        activities: Arc<dyn ActivityRepository>,
        evaluation: Arc<EvaluationService>,
    ) -> Self {
        Self {
            clock,
            sessions,
            activities,
            evaluation,
        }
    }

    /// Validate and store a new session for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::Draft` for invalid input and `InterviewError::Storage`
    /// when persistence fails.
    pub async fn create(
        &self,
        user_id: UserId,
        draft: SessionDraft,
    ) -> Result<InterviewSession, InterviewError> {
        let now = self.clock.now();
        let validated = draft.validate(user_id, now)?;
        let session = self.sessions.insert_session(validated).await?;
        tracing::debug!(session_id = %session.id(), user_id = %user_id, "session created");

        self.log(
            NewActivity::new(user_id, session.id(), ActivityAction::Created, now)
                .with_detail("role", session.role().as_str())
                .with_detail("category", session.category().as_str()),
        )
        .await?;
        Ok(session)
    }

    /// Fetch one session owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::NotFound` when the session does not exist and
    /// `InterviewError::Unauthorized` when it belongs to someone else.
    pub async fn get(
        &self,
        user_id: UserId,
        id: SessionId,
    ) -> Result<InterviewSession, InterviewError> {
        let session = self
            .sessions
            .get_session(id)
            .await?
            .ok_or(InterviewError::NotFound)?;
        if !session.is_owned_by(user_id) {
            return Err(InterviewError::Unauthorized);
        }
        Ok(session)
    }

    /// One page of the user's sessions.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::Storage` when the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        request: SessionListRequest,
    ) -> Result<Page<InterviewSession>, InterviewError> {
        let filter = SessionFilter {
            role: request.role,
            category: request.category,
            status: request.status,
            search: request.search,
            ..SessionFilter::for_user(user_id)
        };
        let page = request.page.normalized();
        let total = self.sessions.count_sessions(&filter).await?;
        let items = self
            .sessions
            .find_sessions(&SessionQuery {
                filter,
                sort: request.sort,
                skip: page.skip(),
                limit: Some(page.limit),
            })
            .await?;
        Ok(Page::new(items, page, total))
    }

    /// Apply a partial update.
    ///
    /// The score is recomputed from the resulting question list. A transition into
    /// `completed` with questions attaches per-session insights and is logged as
    /// `completed`; anything else is logged as `updated`.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::NotFound`/`Unauthorized` for a missing or foreign
    /// session, `InterviewError::Draft` for invalid questions, and
    /// `InterviewError::Storage` when persistence fails.
    pub async fn update(
        &self,
        user_id: UserId,
        id: SessionId,
        update: SessionUpdate,
    ) -> Result<InterviewSession, InterviewError> {
        let mut session = self.get(user_id, id).await?;
        let changed = update.changed_fields();

        if let Some(questions) = update.questions {
            session.replace_questions(validate_questions(questions)?);
        }
        if let Some(tags) = update.tags {
            session.set_tags(tags);
        }
        let previous = update
            .status
            .map_or(session.status(), |status| session.set_status(status));

        let completed_now =
            session.status() == SessionStatus::Completed && previous != SessionStatus::Completed;
        if completed_now && !session.questions().is_empty() {
            session.attach_insights(summarize(session.questions()));
        }

        let now = self.clock.now();
        let session = self.persist(session, now).await?;

        let activity = if completed_now {
            NewActivity::new(user_id, id, ActivityAction::Completed, now)
                .with_detail("totalScore", session.total_score())
                .with_detail("questionCount", session.questions().len())
        } else {
            NewActivity::new(user_id, id, ActivityAction::Updated, now)
                .with_detail("fields", changed)
        };
        self.log(activity).await?;
        Ok(session)
    }

    /// Delete a session. The activity log keeps its records.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::NotFound`/`Unauthorized` for a missing or foreign
    /// session and `InterviewError::Storage` when persistence fails.
    pub async fn delete(&self, user_id: UserId, id: SessionId) -> Result<(), InterviewError> {
        let session = self.get(user_id, id).await?;
        self.sessions
            .delete_session(id)
            .await
            .map_err(not_found_as_interview)?;
        tracing::debug!(session_id = %id, "session deleted");

        self.log(
            NewActivity::new(user_id, id, ActivityAction::Deleted, self.clock.now())
                .with_detail("role", session.role().as_str())
                .with_detail("category", session.category().as_str()),
        )
        .await
    }

    /// Evaluate an answer, append it to the session and rescore.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::NotFound`/`Unauthorized` for a missing or foreign
    /// session, `InterviewError::Question` when the question or answer is blank,
    /// and `InterviewError::Storage` when persistence fails.
    pub async fn record_answer(
        &self,
        user_id: UserId,
        id: SessionId,
        submission: AnswerSubmission,
    ) -> Result<RecordedAnswer, InterviewError> {
        let mut session = self.get(user_id, id).await?;
        if submission.question_text.trim().is_empty() {
            return Err(QuestionError::EmptyQuestion.into());
        }
        if submission.answer.trim().is_empty() {
            return Err(QuestionError::EmptyAnswer.into());
        }

        let evaluation = self
            .evaluation
            .evaluate(
                &submission.question_text,
                &submission.answer,
                session.role(),
                session.category(),
            )
            .await;
        let question = QuestionEvaluation::new(
            submission.question_text,
            submission.answer,
            i64::from(evaluation.score),
            evaluation.feedback.clone(),
            submission
                .category
                .unwrap_or_else(|| QuestionCategory::from(session.category())),
            submission.difficulty,
        )?;
        session.push_question(question);

        let now = self.clock.now();
        let session = self.persist(session, now).await?;
        self.log(
            NewActivity::new(user_id, id, ActivityAction::Updated, now)
                .with_detail("questionCount", session.questions().len())
                .with_detail("score", evaluation.score),
        )
        .await?;

        Ok(RecordedAnswer {
            session,
            evaluation,
        })
    }

    async fn persist(
        &self,
        session: InterviewSession,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<InterviewSession, InterviewError> {
        let mut session = recompute_score(session);
        session.touch(now);
        self.sessions
            .update_session(&session)
            .await
            .map_err(not_found_as_interview)?;
        tracing::debug!(
            session_id = %session.id(),
            total_score = session.total_score(),
            "session saved"
        );
        Ok(session)
    }

    async fn log(&self, activity: NewActivity) -> Result<(), InterviewError> {
        self.activities.append_activity(activity).await?;
        Ok(())
    }
}

fn not_found_as_interview(err: StorageError) -> InterviewError {
    match err {
        StorageError::NotFound => InterviewError::NotFound,
        other => InterviewError::Storage(other),
    }
}
