use interview_core::model::{ActivityAction, ActivityRecord, NewActivity};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_activity_row, parse_column, ser, to_json, u64_from_i64};
use crate::query::{ActivityFilter, ActivityQuery, sort_action_counts};
use crate::repository::{ActivityRepository, StorageError};

/// `WHERE` clause with placeholders `?1..`; binds follow the same order.
fn where_clause(filter: &ActivityFilter) -> String {
    let mut sql = String::from(" WHERE user_id = ?1");
    let mut bind_index = 2;
    if filter.action.is_some() {
        sql.push_str(&format!(" AND action = ?{bind_index}"));
        bind_index += 1;
    }
    if filter.from.is_some() {
        sql.push_str(&format!(" AND timestamp >= ?{bind_index}"));
        bind_index += 1;
    }
    if filter.until.is_some() {
        sql.push_str(&format!(" AND timestamp <= ?{bind_index}"));
    }
    sql
}

fn bind_filter<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &ActivityFilter,
) -> Result<sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>, StorageError>
{
    query = query.bind(id_i64("user_id", filter.user_id.value())?);
    if let Some(action) = filter.action {
        query = query.bind(action.as_str());
    }
    if let Some(from) = filter.from {
        query = query.bind(from);
    }
    if let Some(until) = filter.until {
        query = query.bind(until);
    }
    Ok(query)
}

fn filter_bind_count(filter: &ActivityFilter) -> usize {
    1 + usize::from(filter.action.is_some())
        + usize::from(filter.from.is_some())
        + usize::from(filter.until.is_some())
}

#[async_trait::async_trait]
impl ActivityRepository for SqliteRepository {
    async fn append_activity(
        &self,
        activity: NewActivity,
    ) -> Result<ActivityRecord, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO activity_logs (user_id, session_id, action, details, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_i64("user_id", activity.user_id.value())?)
        .bind(id_i64("session_id", activity.session_id.value())?)
        .bind(activity.action.as_str())
        .bind(to_json(&activity.details)?)
        .bind(activity.timestamp)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(activity.assign_id(res.last_insert_rowid()))
    }

    async fn find_activities(
        &self,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityRecord>, StorageError> {
        let next = filter_bind_count(&query.filter) + 1;
        let sql = format!(
            r"
                SELECT id, user_id, session_id, action, details, timestamp
                FROM activity_logs{}
                ORDER BY timestamp DESC, id DESC
                LIMIT ?{} OFFSET ?{}
            ",
            where_clause(&query.filter),
            next,
            next + 1
        );

        let limit = match query.limit {
            Some(limit) => i64::try_from(limit).unwrap_or(i64::MAX),
            None => -1,
        };
        let rows = bind_filter(sqlx::query(&sql), &query.filter)?
            .bind(limit)
            .bind(i64::try_from(query.skip).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_activity_row(&row)?);
        }
        Ok(out)
    }

    async fn count_activities(&self, filter: &ActivityFilter) -> Result<u64, StorageError> {
        let sql = format!(
            "SELECT COUNT(*) AS n FROM activity_logs{}",
            where_clause(filter)
        );
        let row = bind_filter(sqlx::query(&sql), filter)?
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u64_from_i64("count", row.try_get::<i64, _>("n").map_err(ser)?)
    }

    async fn action_counts(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<(ActivityAction, u64)>, StorageError> {
        let sql = format!(
            "SELECT action, COUNT(*) AS n FROM activity_logs{} GROUP BY action",
            where_clause(filter)
        );
        let rows = bind_filter(sqlx::query(&sql), filter)?
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let action: ActivityAction = parse_column(&row, "action")?;
            let n = u64_from_i64("count", row.try_get::<i64, _>("n").map_err(ser)?)?;
            counts.push((action, n));
        }
        Ok(sort_action_counts(counts))
    }
}
