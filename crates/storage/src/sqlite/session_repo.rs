use chrono::{DateTime, Utc};
use interview_core::model::{InterviewSession, QuestionEvaluation, SessionId, ValidatedSession};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqliteConnection};
use std::collections::HashMap;

use super::SqliteRepository;
use super::mapping::{
    conn, id_i64, like_contains, map_question_row, map_session_row, ser, session_id_from_i64,
    to_json, u64_from_i64,
};
use crate::query::{SessionFilter, SessionQuery, SessionSortField, SortOrder};
use crate::repository::{SessionRepository, StorageError};

const SESSION_COLUMNS: &str = r"
    id, user_id, role, category, status, duration, total_score,
    insights, tags, created_at, updated_at
";

enum BindValue {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

type Query<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_all<'q>(mut query: Query<'q>, values: &'q [BindValue]) -> Query<'q> {
    for value in values {
        query = match value {
            BindValue::Int(v) => query.bind(*v),
            BindValue::Text(v) => query.bind(v.as_str()),
            BindValue::Time(v) => query.bind(*v),
        };
    }
    query
}

/// Builds the `WHERE` clause for a filter, numbering placeholders from 1.
fn where_clause(filter: &SessionFilter) -> Result<(String, Vec<BindValue>), StorageError> {
    let mut sql = String::from(" WHERE user_id = ?1");
    let mut binds = vec![BindValue::Int(id_i64("user_id", filter.user_id.value())?)];

    let mut push = |sql: &mut String, clause: &str, value: BindValue| {
        binds.push(value);
        sql.push_str(&clause.replace("{}", &binds.len().to_string()));
    };

    if let Some(role) = filter.role {
        push(&mut sql, " AND role = ?{}", BindValue::Text(role.as_str().into()));
    }
    if let Some(category) = filter.category {
        push(
            &mut sql,
            " AND category = ?{}",
            BindValue::Text(category.as_str().into()),
        );
    }
    if let Some(status) = filter.status {
        push(&mut sql, " AND status = ?{}", BindValue::Text(status.as_str().into()));
    }
    if let Some(from) = filter.created_from {
        push(&mut sql, " AND created_at >= ?{}", BindValue::Time(from));
    }
    if let Some(term) = filter.search_term() {
        push(
            &mut sql,
            r" AND (LOWER(role) LIKE ?{} ESCAPE '\'
                 OR EXISTS (SELECT 1 FROM json_each(interview_sessions.tags)
                            WHERE LOWER(json_each.value) LIKE ?{} ESCAPE '\'))",
            BindValue::Text(like_contains(&term)),
        );
    }

    Ok((sql, binds))
}

fn order_clause(field: SessionSortField, order: SortOrder) -> String {
    let column = match field {
        SessionSortField::CreatedAt => "created_at",
        SessionSortField::UpdatedAt => "updated_at",
        SessionSortField::TotalScore => "total_score",
        SessionSortField::Duration => "duration",
    };
    let dir = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!(" ORDER BY {column} {dir}, id {dir}")
}

async fn insert_questions(
    tx: &mut SqliteConnection,
    session_id: i64,
    questions: &[QuestionEvaluation],
) -> Result<(), StorageError> {
    for (position, question) in questions.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| StorageError::Serialization("question position overflow".into()))?;
        sqlx::query(
            r"
                INSERT INTO session_questions (
                    session_id, position, question_text, user_answer,
                    score, feedback, category, difficulty
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(session_id)
        .bind(position)
        .bind(question.question_text())
        .bind(question.user_answer())
        .bind(i64::from(question.score()))
        .bind(question.feedback())
        .bind(question.category().as_str())
        .bind(question.difficulty().as_str())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
    }
    Ok(())
}

impl SqliteRepository {
    /// Loads questions for the given sessions, grouped by session and ordered by position.
    async fn questions_for(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, Vec<QuestionEvaluation>>, StorageError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut sql = String::from(
            r"
                SELECT
                    session_id, question_text, user_answer, score,
                    feedback, category, difficulty
                FROM session_questions
                WHERE session_id IN (
            ",
        );
        for i in 0..ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push_str(")\n ORDER BY session_id ASC, position ASC");

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut grouped: HashMap<i64, Vec<QuestionEvaluation>> = HashMap::new();
        for row in rows {
            let session_id: i64 = row.try_get("session_id").map_err(ser)?;
            grouped
                .entry(session_id)
                .or_default()
                .push(map_question_row(&row)?);
        }
        Ok(grouped)
    }

    async fn hydrate(&self, rows: Vec<SqliteRow>) -> Result<Vec<InterviewSession>, StorageError> {
        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            ids.push(row.try_get::<i64, _>("id").map_err(ser)?);
        }
        let mut questions = self.questions_for(&ids).await?;

        let mut out = Vec::with_capacity(rows.len());
        for (row, id) in rows.iter().zip(ids) {
            out.push(map_session_row(row, questions.remove(&id).unwrap_or_default())?);
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(
        &self,
        session: ValidatedSession,
    ) -> Result<InterviewSession, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // A new session always starts in progress without insights.
        let res = sqlx::query(
            r"
                INSERT INTO interview_sessions (
                    user_id, role, category, status, duration, total_score,
                    insights, tags, created_at, updated_at
                )
                VALUES (?1, ?2, ?3, 'in-progress', ?4, ?5, NULL, ?6, ?7, ?7)
            ",
        )
        .bind(id_i64("user_id", session.user_id.value())?)
        .bind(session.role.as_str())
        .bind(session.category.as_str())
        .bind(i64::from(session.duration))
        .bind(i64::from(session.total_score))
        .bind(to_json(&session.tags)?)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        let row_id = res.last_insert_rowid();
        insert_questions(&mut *tx, row_id, &session.questions).await?;
        tx.commit().await.map_err(conn)?;

        Ok(session.assign_id(session_id_from_i64(row_id)?))
    }

    async fn update_session(&self, session: &InterviewSession) -> Result<(), StorageError> {
        let id = id_i64("session_id", session.id().value())?;
        let insights = session.insights().map(to_json).transpose()?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                UPDATE interview_sessions
                SET role = ?2, category = ?3, status = ?4, duration = ?5,
                    total_score = ?6, insights = ?7, tags = ?8, updated_at = ?9
                WHERE id = ?1
            ",
        )
        .bind(id)
        .bind(session.role().as_str())
        .bind(session.category().as_str())
        .bind(session.status().as_str())
        .bind(i64::from(session.duration()))
        .bind(i64::from(session.total_score()))
        .bind(insights)
        .bind(to_json(session.tags())?)
        .bind(session.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        sqlx::query("DELETE FROM session_questions WHERE session_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        insert_questions(&mut *tx, id, session.questions()).await?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM interview_sessions WHERE id = ?1")
            .bind(id_i64("session_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM interview_sessions WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_i64("session_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<InterviewSession>, StorageError> {
        let (filter_sql, mut binds) = where_clause(&query.filter)?;
        let mut sql = format!("SELECT {SESSION_COLUMNS} FROM interview_sessions{filter_sql}");
        sql.push_str(&order_clause(query.sort.field, query.sort.order));

        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        let limit = match query.limit {
            Some(limit) => i64::try_from(limit).unwrap_or(i64::MAX),
            None => -1,
        };
        binds.push(BindValue::Int(limit));
        sql.push_str(&format!(" LIMIT ?{}", binds.len()));
        binds.push(BindValue::Int(i64::try_from(query.skip).unwrap_or(i64::MAX)));
        sql.push_str(&format!(" OFFSET ?{}", binds.len()));

        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        self.hydrate(rows).await
    }

    async fn count_sessions(&self, filter: &SessionFilter) -> Result<u64, StorageError> {
        let (filter_sql, binds) = where_clause(filter)?;
        let sql = format!("SELECT COUNT(*) AS n FROM interview_sessions{filter_sql}");
        let row = bind_all(sqlx::query(&sql), &binds)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u64_from_i64("count", row.try_get::<i64, _>("n").map_err(ser)?)
    }
}
