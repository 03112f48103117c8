use std::sync::Arc;

use interview_core::model::RoleDefinition;
use storage::repository::RoleRepository;

use crate::error::RoleServiceError;

/// The role catalogue that feeds category guidance into question prompts.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
}

impl RoleService {
    #[must_use]
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Active roles, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RoleServiceError::Storage` when the query fails.
    pub async fn list_active(&self) -> Result<Vec<RoleDefinition>, RoleServiceError> {
        Ok(self.roles.list_roles(true).await?)
    }

    /// # Errors
    ///
    /// Returns `RoleServiceError::Storage` when the query fails.
    pub async fn get(&self, name: &str) -> Result<Option<RoleDefinition>, RoleServiceError> {
        Ok(self.roles.get_role(name.trim()).await?)
    }

    /// Validate and store a role, replacing any role with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RoleServiceError::Role` for an invalid definition and
    /// `RoleServiceError::Storage` when persistence fails.
    pub async fn upsert(&self, role: RoleDefinition) -> Result<RoleDefinition, RoleServiceError> {
        let role = role.validate()?;
        self.roles.upsert_role(&role).await?;
        tracing::debug!(role = %role.name, "role saved");
        Ok(role)
    }
}
