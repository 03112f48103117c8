use interview_core::model::RoleDefinition;

use super::SqliteRepository;
use super::mapping::{conn, map_role_row, to_json};
use crate::repository::{RoleRepository, StorageError};

#[async_trait::async_trait]
impl RoleRepository for SqliteRepository {
    async fn upsert_role(&self, role: &RoleDefinition) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO interview_roles (name, description, categories, is_active)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(name) DO UPDATE SET
                    description = excluded.description,
                    categories = excluded.categories,
                    is_active = excluded.is_active
            ",
        )
        .bind(&role.name)
        .bind(&role.description)
        .bind(to_json(&role.categories)?)
        .bind(i64::from(role.is_active))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_role(&self, name: &str) -> Result<Option<RoleDefinition>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT name, description, categories, is_active
                FROM interview_roles
                WHERE name = ?1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_role_row).transpose()
    }

    async fn list_roles(&self, active_only: bool) -> Result<Vec<RoleDefinition>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT name, description, categories, is_active
                FROM interview_roles
                WHERE ?1 = 0 OR is_active = 1
                ORDER BY name ASC
            ",
        )
        .bind(i64::from(active_only))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_role_row(&row)?);
        }
        Ok(out)
    }
}
