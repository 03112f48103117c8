use async_trait::async_trait;
use interview_core::model::{
    ActivityAction, ActivityRecord, InterviewSession, NewActivity, RoleDefinition, SessionId,
    ValidatedSession,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::query::{
    ActivityFilter, ActivityQuery, SessionFilter, SessionQuery, activity_order, sort_action_counts,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for interview sessions and their questions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn insert_session(
        &self,
        session: ValidatedSession,
    ) -> Result<InterviewSession, StorageError>;

    /// Overwrite an existing session, questions included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn update_session(&self, session: &InterviewSession) -> Result<(), StorageError>;

    /// Remove a session and its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn delete_session(&self, id: SessionId) -> Result<(), StorageError>;

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures; a missing session is `Ok(None)`.
    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError>;

    /// Filtered, sorted and paged listing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn find_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<InterviewSession>, StorageError>;

    /// Number of sessions matching the filter, ignoring paging.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn count_sessions(&self, filter: &SessionFilter) -> Result<u64, StorageError>;
}

/// Append-only activity log.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Append a record and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_activity(&self, activity: NewActivity)
    -> Result<ActivityRecord, StorageError>;

    /// Matching records, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn find_activities(
        &self,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn count_activities(&self, filter: &ActivityFilter) -> Result<u64, StorageError>;

    /// Records per action, largest count first. Actions with no records are omitted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn action_counts(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<(ActivityAction, u64)>, StorageError>;
}

/// Catalogue of job roles and their per-category prompts, keyed by name.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the role cannot be stored.
    async fn upsert_role(&self, role: &RoleDefinition) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for storage failures; a missing role is `Ok(None)`.
    async fn get_role(&self, name: &str) -> Result<Option<RoleDefinition>, StorageError>;

    /// Roles ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn list_roles(&self, active_only: bool) -> Result<Vec<RoleDefinition>, StorageError>;
}

fn page<T>(items: Vec<T>, skip: u64, limit: Option<u64>) -> Vec<T> {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
    items.into_iter().skip(skip).take(limit).collect()
}

fn lock_err<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, InterviewSession>>>,
    // Last issued session id; never reused after a delete.
    last_session_id: Arc<AtomicU64>,
    activities: Arc<Mutex<Vec<ActivityRecord>>>,
    roles: Arc<Mutex<HashMap<String, RoleDefinition>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(
        &self,
        session: ValidatedSession,
    ) -> Result<InterviewSession, StorageError> {
        let mut guard = self.sessions.lock().map_err(lock_err)?;
        let next = self.last_session_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = session.assign_id(SessionId::new(next));
        guard.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update_session(&self, session: &InterviewSession) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(lock_err)?;
        let slot = guard.get_mut(&session.id()).ok_or(StorageError::NotFound)?;
        *slot = session.clone();
        Ok(())
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(lock_err)?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError> {
        let guard = self.sessions.lock().map_err(lock_err)?;
        Ok(guard.get(&id).cloned())
    }

    async fn find_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<InterviewSession>, StorageError> {
        let guard = self.sessions.lock().map_err(lock_err)?;
        let mut found: Vec<InterviewSession> = guard
            .values()
            .filter(|s| query.filter.matches(s))
            .cloned()
            .collect();
        found.sort_by(|a, b| query.sort.compare(a, b));
        Ok(page(found, query.skip, query.limit))
    }

    async fn count_sessions(&self, filter: &SessionFilter) -> Result<u64, StorageError> {
        let guard = self.sessions.lock().map_err(lock_err)?;
        Ok(guard.values().filter(|s| filter.matches(s)).count() as u64)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryRepository {
    async fn append_activity(
        &self,
        activity: NewActivity,
    ) -> Result<ActivityRecord, StorageError> {
        let mut guard = self.activities.lock().map_err(lock_err)?;
        let next = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("activity id overflow".into()))?
            + 1;
        let record = activity.assign_id(next);
        guard.push(record.clone());
        Ok(record)
    }

    async fn find_activities(
        &self,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityRecord>, StorageError> {
        let guard = self.activities.lock().map_err(lock_err)?;
        let mut found: Vec<ActivityRecord> = guard
            .iter()
            .filter(|r| query.filter.matches(r))
            .cloned()
            .collect();
        found.sort_by(activity_order);
        Ok(page(found, query.skip, query.limit))
    }

    async fn count_activities(&self, filter: &ActivityFilter) -> Result<u64, StorageError> {
        let guard = self.activities.lock().map_err(lock_err)?;
        Ok(guard.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn action_counts(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<(ActivityAction, u64)>, StorageError> {
        let guard = self.activities.lock().map_err(lock_err)?;
        let mut counts: HashMap<ActivityAction, u64> = HashMap::new();
        for record in guard.iter().filter(|r| filter.matches(r)) {
            *counts.entry(record.action).or_default() += 1;
        }
        Ok(sort_action_counts(counts.into_iter().collect()))
    }
}

#[async_trait]
impl RoleRepository for InMemoryRepository {
    async fn upsert_role(&self, role: &RoleDefinition) -> Result<(), StorageError> {
        let mut guard = self.roles.lock().map_err(lock_err)?;
        guard.insert(role.name.clone(), role.clone());
        Ok(())
    }

    async fn get_role(&self, name: &str) -> Result<Option<RoleDefinition>, StorageError> {
        let guard = self.roles.lock().map_err(lock_err)?;
        Ok(guard.get(name).cloned())
    }

    async fn list_roles(&self, active_only: bool) -> Result<Vec<RoleDefinition>, StorageError> {
        let guard = self.roles.lock().map_err(lock_err)?;
        let mut roles: Vec<RoleDefinition> = guard
            .values()
            .filter(|r| !active_only || r.is_active)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub roles: Arc<dyn RoleRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        let activities: Arc<dyn ActivityRepository> = Arc::new(repo.clone());
        let roles: Arc<dyn RoleRepository> = Arc::new(repo);
        Self {
            sessions,
            activities,
            roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SessionSort, SessionSortField, SortOrder};
    use chrono::Duration;
    use interview_core::model::{
        JobRole, SessionCategory, SessionDraft, SessionStatus, UserId,
    };
    use interview_core::time::fixed_now;

    fn draft(user: u64, score: i64, minutes_ago: i64) -> ValidatedSession {
        let mut draft = SessionDraft::new(JobRole::BackendDeveloper, SessionCategory::Technical, 45);
        draft.total_score = Some(score);
        draft
            .validate(UserId::new(user), fixed_now() - Duration::minutes(minutes_ago))
            .unwrap()
    }

    #[tokio::test]
    async fn assigns_sequential_ids_and_round_trips() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_session(draft(1, 50, 0)).await.unwrap();
        let second = repo.insert_session(draft(1, 60, 0)).await.unwrap();
        assert_eq!(first.id(), SessionId::new(1));
        assert_eq!(second.id(), SessionId::new(2));

        let mut updated = second.clone();
        updated.set_status(SessionStatus::Completed);
        repo.update_session(&updated).await.unwrap();
        let fetched = repo.get_session(second.id()).await.unwrap().unwrap();
        assert!(fetched.is_completed());
    }

    #[tokio::test]
    async fn deleted_session_ids_are_not_reissued() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_session(draft(1, 50, 0)).await.unwrap();
        repo.delete_session(first.id()).await.unwrap();

        let second = repo.insert_session(draft(1, 60, 0)).await.unwrap();
        assert_ne!(second.id(), first.id());
        assert_eq!(second.id(), SessionId::new(2));
    }

    #[tokio::test]
    async fn update_and_delete_missing_session_fail() {
        let repo = InMemoryRepository::new();
        let ghost = draft(1, 0, 0).assign_id(SessionId::new(7));
        assert!(matches!(
            repo.update_session(&ghost).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.delete_session(SessionId::new(7)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn find_sorts_pages_and_counts() {
        let repo = InMemoryRepository::new();
        for (score, age) in [(70, 3), (90, 2), (40, 1)] {
            repo.insert_session(draft(1, score, age)).await.unwrap();
        }
        repo.insert_session(draft(2, 100, 0)).await.unwrap();

        let filter = SessionFilter::for_user(UserId::new(1));
        let mut query = SessionQuery::all(filter.clone());
        let newest: Vec<u8> = repo
            .find_sessions(&query)
            .await
            .unwrap()
            .iter()
            .map(InterviewSession::total_score)
            .collect();
        assert_eq!(newest, [40, 90, 70]);

        query.sort = SessionSort {
            field: SessionSortField::TotalScore,
            order: SortOrder::Asc,
        };
        query.skip = 1;
        query.limit = Some(1);
        let page = repo.find_sessions(&query).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].total_score(), 70);

        assert_eq!(repo.count_sessions(&filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn activity_counts_by_action() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        for action in [
            ActivityAction::Created,
            ActivityAction::Updated,
            ActivityAction::Updated,
        ] {
            repo.append_activity(NewActivity::new(user, SessionId::new(1), action, fixed_now()))
                .await
                .unwrap();
        }
        let filter = ActivityFilter::for_user(user);
        assert_eq!(
            repo.action_counts(&filter).await.unwrap(),
            [(ActivityAction::Updated, 2), (ActivityAction::Created, 1)]
        );
        let newest = repo
            .find_activities(&ActivityQuery {
                filter,
                skip: 0,
                limit: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(newest[0].id, 3);
    }
}
