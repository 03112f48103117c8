use std::sync::Arc;

use interview_core::analytics::{AnalyticsReport, RECENT_ACTIVITY_WINDOW_DAYS, build_report};
use interview_core::model::UserId;
use interview_core::time::days_ago;
use storage::query::{ActivityFilter, SessionFilter, SessionQuery};
use storage::repository::{ActivityRepository, SessionRepository};

use crate::Clock;
use crate::error::AnalyticsError;

/// Aggregates a user's stored sessions into an analytics report.
#[derive(Clone)]
pub struct AnalyticsService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    activities: Arc<dyn ActivityRepository>,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        activities: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            clock,
            sessions,
            activities,
        }
    }

    /// Build the full report for `user_id`. A user without sessions gets the
    /// zero report with the single first-interview insight.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Storage` when reading sessions or activity fails.
    pub async fn compute_analytics(
        &self,
        user_id: UserId,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        let now = self.clock.now();
        let sessions = self
            .sessions
            .find_sessions(&SessionQuery::all(SessionFilter::for_user(user_id)))
            .await?;
        let recent_activity = self
            .activities
            .count_activities(
                &ActivityFilter::for_user(user_id)
                    .since(days_ago(now, RECENT_ACTIVITY_WINDOW_DAYS)),
            )
            .await?;

        tracing::debug!(
            user_id = %user_id,
            sessions = sessions.len(),
            recent_activity,
            "computing analytics"
        );
        Ok(build_report(&sessions, recent_activity, now))
    }
}
