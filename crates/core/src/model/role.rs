use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoleError {
    #[error("role name cannot be empty")]
    EmptyName,

    #[error("role description cannot be empty")]
    EmptyDescription,

    #[error("category {index} has an empty name")]
    EmptyCategoryName { index: usize },

    #[error("category {name} has an empty AI prompt")]
    EmptyCategoryPrompt { name: String },
}

/// Per-category guidance used when asking the AI backend for questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ai_prompt: String,
}

/// Catalogue entry describing a job role and its interview categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub categories: Vec<RoleCategory>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RoleDefinition {
    /// Validate and normalize a role definition.
    ///
    /// # Errors
    ///
    /// Returns `RoleError` when the name, description or any category is blank.
    pub fn validate(mut self) -> Result<Self, RoleError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(RoleError::EmptyName);
        }
        if self.description.trim().is_empty() {
            return Err(RoleError::EmptyDescription);
        }
        for (index, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                return Err(RoleError::EmptyCategoryName { index });
            }
            if category.ai_prompt.trim().is_empty() {
                return Err(RoleError::EmptyCategoryPrompt {
                    name: category.name.clone(),
                });
            }
        }
        Ok(self)
    }

    /// Find the AI prompt for a category, matched case-insensitively.
    #[must_use]
    pub fn prompt_for(&self, category: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(category))
            .map(|c| c.ai_prompt.as_str())
    }
}
