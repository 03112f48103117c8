use std::sync::Arc;

use chrono::{DateTime, Utc};
use interview_core::analytics::RECENT_ACTIVITY_WINDOW_DAYS;
use interview_core::model::{ActivityAction, ActivityRecord, UserId};
use interview_core::time::days_ago;
use serde::Serialize;
use storage::query::{ActivityFilter, ActivityQuery};
use storage::repository::ActivityRepository;

use crate::Clock;
use crate::error::ActivityError;
use crate::paging::{Page, PageRequest};

const DEFAULT_ACTIVITY_PAGE_LIMIT: u64 = 20;

/// Listing parameters for a user's activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityListRequest {
    pub action: Option<ActivityAction>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub page: PageRequest,
}

impl Default for ActivityListRequest {
    fn default() -> Self {
        Self {
            action: None,
            from: None,
            until: None,
            page: PageRequest::new(1, DEFAULT_ACTIVITY_PAGE_LIMIT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    pub action: ActivityAction,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// Over the whole log, ignoring the listing filter.
    pub action_stats: Vec<ActionCount>,
    pub recent_activity_count: u64,
    /// Matches of the listing filter.
    pub total_activities: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub activities: Page<ActivityRecord>,
    pub statistics: ActivityStats,
}

/// Read access to the append-only activity log.
#[derive(Clone)]
pub struct ActivityService {
    clock: Clock,
    activities: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    #[must_use]
    pub fn new(clock: Clock, activities: Arc<dyn ActivityRepository>) -> Self {
        Self { clock, activities }
    }

    /// One page of the user's activity, newest first, with per-action statistics.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Storage` when a query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        request: ActivityListRequest,
    ) -> Result<ActivityLog, ActivityError> {
        let filter = ActivityFilter {
            action: request.action,
            from: request.from,
            until: request.until,
            ..ActivityFilter::for_user(user_id)
        };
        let page = request.page.normalized();

        let records = self
            .activities
            .find_activities(&ActivityQuery {
                filter: filter.clone(),
                skip: page.skip(),
                limit: Some(page.limit),
            })
            .await?;
        let total = self.activities.count_activities(&filter).await?;

        let everything = ActivityFilter::for_user(user_id);
        let action_stats = self
            .activities
            .action_counts(&everything)
            .await?
            .into_iter()
            .map(|(action, count)| ActionCount { action, count })
            .collect();
        let recent_activity_count = self.recent_count(user_id).await?;

        Ok(ActivityLog {
            activities: Page::new(records, page, total),
            statistics: ActivityStats {
                action_stats,
                recent_activity_count,
                total_activities: total,
            },
        })
    }

    /// Records in the last seven days.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Storage` when the count fails.
    pub async fn recent_count(&self, user_id: UserId) -> Result<u64, ActivityError> {
        let since = days_ago(self.clock.now(), RECENT_ACTIVITY_WINDOW_DAYS);
        let filter = ActivityFilter::for_user(user_id).since(since);
        Ok(self.activities.count_activities(&filter).await?)
    }
}
