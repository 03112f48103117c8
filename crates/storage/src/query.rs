//! Filter, sort and paging inputs shared by every repository adapter.

use chrono::{DateTime, Utc};
use interview_core::model::{
    ActivityAction, ActivityRecord, InterviewSession, JobRole, SessionCategory, SessionStatus,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

//
// ─── SESSIONS ──────────────────────────────────────────────────────────────────
//

/// Which sessions to return. Always scoped to one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFilter {
    pub user_id: UserId,
    pub role: Option<JobRole>,
    pub category: Option<SessionCategory>,
    pub status: Option<SessionStatus>,
    /// Case-insensitive substring over the role name and every tag.
    pub search: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
}

impl SessionFilter {
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: None,
            category: None,
            status: None,
            search: None,
            created_from: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn created_since(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    /// Normalized search term, `None` when absent or blank.
    #[must_use]
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    #[must_use]
    pub fn matches(&self, session: &InterviewSession) -> bool {
        if !session.is_owned_by(self.user_id) {
            return false;
        }
        if self.role.is_some_and(|r| r != session.role())
            || self.category.is_some_and(|c| c != session.category())
            || self.status.is_some_and(|s| s != session.status())
        {
            return false;
        }
        if self.created_from.is_some_and(|from| session.created_at() < from) {
            return false;
        }
        match self.search_term() {
            None => true,
            Some(term) => {
                session.role().as_str().to_lowercase().contains(&term)
                    || session
                        .tags()
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&term))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    TotalScore,
    Duration,
}

impl SessionSortField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionSortField::CreatedAt => "createdAt",
            SessionSortField::UpdatedAt => "updatedAt",
            SessionSortField::TotalScore => "totalScore",
            SessionSortField::Duration => "duration",
        }
    }
}

impl FromStr for SessionSortField {
    type Err = ParseQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            SessionSortField::CreatedAt,
            SessionSortField::UpdatedAt,
            SessionSortField::TotalScore,
            SessionSortField::Duration,
        ]
        .into_iter()
        .find(|f| f.as_str() == s.trim())
        .ok_or_else(|| ParseQueryError::new("sort field", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseQueryError::new("sort order", s)),
        }
    }
}

/// Sort order for session listings. Defaults to newest first.
///
/// Ties are broken by id in the same direction so pages stay stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSort {
    pub field: SessionSortField,
    pub order: SortOrder,
}

impl SessionSort {
    #[must_use]
    pub fn compare(&self, a: &InterviewSession, b: &InterviewSession) -> Ordering {
        let primary = match self.field {
            SessionSortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SessionSortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            SessionSortField::TotalScore => a.total_score().cmp(&b.total_score()),
            SessionSortField::Duration => a.duration().cmp(&b.duration()),
        };
        self.order.apply(primary.then_with(|| a.id().cmp(&b.id())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub filter: SessionFilter,
    pub sort: SessionSort,
    pub skip: u64,
    /// `None` returns every match after `skip`.
    pub limit: Option<u64>,
}

impl SessionQuery {
    /// Every matching session, default order.
    #[must_use]
    pub fn all(filter: SessionFilter) -> Self {
        Self {
            filter,
            sort: SessionSort::default(),
            skip: 0,
            limit: None,
        }
    }
}

//
// ─── ACTIVITY ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFilter {
    pub user_id: UserId,
    pub action: Option<ActivityAction>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl ActivityFilter {
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            action: None,
            from: None,
            until: None,
        }
    }

    #[must_use]
    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Date bounds are inclusive on both ends.
    #[must_use]
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        record.user_id == self.user_id
            && self.action.is_none_or(|a| a == record.action)
            && self.from.is_none_or(|from| record.timestamp >= from)
            && self.until.is_none_or(|until| record.timestamp <= until)
    }
}

/// Activity listing, always newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    pub filter: ActivityFilter,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// Newest first, then highest id first.
#[must_use]
pub fn activity_order(a: &ActivityRecord, b: &ActivityRecord) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
}

/// Count per action, largest first, ties by action name.
#[must_use]
pub fn sort_action_counts(mut counts: Vec<(ActivityAction, u64)>) -> Vec<(ActivityAction, u64)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    counts
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseQueryError {
    kind: &'static str,
    raw: String,
}

impl ParseQueryError {
    fn new(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for ParseQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseQueryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::model::{SessionDraft, SessionId};
    use interview_core::time::fixed_now;

    fn session(id: u64, user: u64, tags: &[&str]) -> InterviewSession {
        let mut draft = SessionDraft::new(JobRole::FrontendDeveloper, SessionCategory::Technical, 30);
        draft.tags = tags.iter().map(|t| (*t).to_string()).collect();
        draft
            .validate(UserId::new(user), fixed_now())
            .unwrap()
            .assign_id(SessionId::new(id))
    }

    #[test]
    fn filter_scopes_to_owner() {
        let filter = SessionFilter::for_user(UserId::new(1));
        assert!(filter.matches(&session(1, 1, &[])));
        assert!(!filter.matches(&session(2, 2, &[])));
    }

    #[test]
    fn search_covers_role_and_tags() {
        let mut filter = SessionFilter::for_user(UserId::new(1));
        filter.search = Some("FRONTEND".into());
        assert!(filter.matches(&session(1, 1, &[])));

        filter.search = Some("hooks".into());
        assert!(filter.matches(&session(1, 1, &["React Hooks"])));
        assert!(!filter.matches(&session(1, 1, &["css"])));

        filter.search = Some("   ".into());
        assert!(filter.matches(&session(1, 1, &[])));
    }

    #[test]
    fn default_sort_is_newest_first_with_id_tiebreak() {
        let sort = SessionSort::default();
        let a = session(1, 1, &[]);
        let b = session(2, 1, &[]);
        assert_eq!(sort.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn sort_inputs_parse() {
        assert_eq!(
            "totalScore".parse::<SessionSortField>().unwrap(),
            SessionSortField::TotalScore
        );
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn action_counts_sort_desc_then_name() {
        let sorted = sort_action_counts(vec![
            (ActivityAction::Updated, 2),
            (ActivityAction::Created, 5),
            (ActivityAction::Deleted, 2),
        ]);
        assert_eq!(
            sorted,
            [
                (ActivityAction::Created, 5),
                (ActivityAction::Deleted, 2),
                (ActivityAction::Updated, 2),
            ]
        );
    }
}
