use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::model::catalog::ParseCatalogError;
use crate::model::ids::{SessionId, UserId};

/// Lifecycle event recorded for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    Completed,
    Started,
}

impl ActivityAction {
    pub const ALL: [ActivityAction; 5] = [
        ActivityAction::Created,
        ActivityAction::Updated,
        ActivityAction::Deleted,
        ActivityAction::Completed,
        ActivityAction::Started,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Updated => "updated",
            ActivityAction::Deleted => "deleted",
            ActivityAction::Completed => "completed",
            ActivityAction::Started => "started",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s.trim())
            .ok_or_else(|| ParseCatalogError::new("activity action", s))
    }
}

/// Free-form details attached to an activity record.
pub type ActivityDetails = Map<String, Value>;

/// Append-only record of something that happened to a session.
///
/// `session_id` is a weak reference: the session may no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: i64,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub action: ActivityAction,
    pub details: ActivityDetails,
    pub timestamp: DateTime<Utc>,
}

/// Activity record before storage assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub action: ActivityAction,
    pub details: ActivityDetails,
    pub timestamp: DateTime<Utc>,
}

impl NewActivity {
    #[must_use]
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        action: ActivityAction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            action,
            details: Map::new(),
            timestamp,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn assign_id(self, id: i64) -> ActivityRecord {
        ActivityRecord {
            id,
            user_id: self.user_id,
            session_id: self.session_id,
            action: self.action,
            details: self.details,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn details_accumulate() {
        let activity = NewActivity::new(
            UserId::new(1),
            SessionId::new(2),
            ActivityAction::Created,
            fixed_now(),
        )
        .with_detail("role", "Software Engineer")
        .with_detail("questionsCount", 3);

        assert_eq!(activity.details.len(), 2);
        assert_eq!(activity.details["questionsCount"], Value::from(3));
    }

    #[test]
    fn action_parses_lowercase() {
        assert_eq!(
            "completed".parse::<ActivityAction>().unwrap(),
            ActivityAction::Completed
        );
        assert!("archived".parse::<ActivityAction>().is_err());
    }
}
