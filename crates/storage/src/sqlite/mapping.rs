use interview_core::model::{
    ActivityDetails, ActivityRecord, Difficulty, InterviewSession, QuestionCategory,
    QuestionEvaluation, RoleCategory, RoleDefinition, SessionId, SessionInsights, UserId,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use std::str::FromStr;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn session_id_from_i64(v: i64) -> Result<SessionId, StorageError> {
    Ok(SessionId::new(i64_to_u64("session_id", v)?))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    i64_to_u64(field, v)
}

/// Parses a stored enum column through its `FromStr` impl.
pub(crate) fn parse_column<T>(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let raw: String = row.try_get(column).map_err(ser)?;
    raw.parse::<T>().map_err(ser)
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

pub(crate) fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_question_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<QuestionEvaluation, StorageError> {
    QuestionEvaluation::new(
        row.try_get::<String, _>("question_text").map_err(ser)?,
        row.try_get::<String, _>("user_answer").map_err(ser)?,
        row.try_get::<i64, _>("score").map_err(ser)?,
        row.try_get::<String, _>("feedback").map_err(ser)?,
        parse_column::<QuestionCategory>(row, "category")?,
        parse_column::<Difficulty>(row, "difficulty")?,
    )
    .map_err(ser)
}

/// Maps a session row; questions are loaded separately and passed in ordered.
pub(crate) fn map_session_row(
    row: &sqlx::sqlite::SqliteRow,
    questions: Vec<QuestionEvaluation>,
) -> Result<InterviewSession, StorageError> {
    let insights: Option<SessionInsights> = row
        .try_get::<Option<String>, _>("insights")
        .map_err(ser)?
        .as_deref()
        .map(from_json)
        .transpose()?;
    let tags: Vec<String> = from_json(&row.try_get::<String, _>("tags").map_err(ser)?)?;

    InterviewSession::from_persisted(
        session_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
        parse_column(row, "role")?,
        parse_column(row, "category")?,
        parse_column(row, "status")?,
        u32_from_i64("duration", row.try_get::<i64, _>("duration").map_err(ser)?)?,
        questions,
        row.try_get::<i64, _>("total_score").map_err(ser)?,
        insights,
        tags,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_activity_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ActivityRecord, StorageError> {
    let details: ActivityDetails = from_json(&row.try_get::<String, _>("details").map_err(ser)?)?;
    Ok(ActivityRecord {
        id: row.try_get("id").map_err(ser)?,
        user_id: user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
        session_id: session_id_from_i64(row.try_get::<i64, _>("session_id").map_err(ser)?)?,
        action: parse_column(row, "action")?,
        details,
        timestamp: row.try_get("timestamp").map_err(ser)?,
    })
}

pub(crate) fn map_role_row(row: &sqlx::sqlite::SqliteRow) -> Result<RoleDefinition, StorageError> {
    let categories: Vec<RoleCategory> =
        from_json(&row.try_get::<String, _>("categories").map_err(ser)?)?;
    Ok(RoleDefinition {
        name: row.try_get("name").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        categories,
        is_active: row.try_get::<i64, _>("is_active").map_err(ser)? != 0,
    })
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_contains(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_contains("react"), "%react%");
        assert_eq!(like_contains("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn id_conversion_rejects_negative() {
        assert!(session_id_from_i64(-1).is_err());
        assert_eq!(session_id_from_i64(4).unwrap(), SessionId::new(4));
    }
}
