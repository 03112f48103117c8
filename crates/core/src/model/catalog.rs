use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {raw}")]
pub struct ParseCatalogError {
    kind: &'static str,
    raw: String,
}

impl ParseCatalogError {
    pub(crate) fn new(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

//
// ─── JOB ROLE ──────────────────────────────────────────────────────────────────
//

/// Job role an interview session practices for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobRole {
    #[serde(rename = "Frontend Developer")]
    FrontendDeveloper,
    #[serde(rename = "Backend Developer")]
    BackendDeveloper,
    #[serde(rename = "Full Stack Developer")]
    FullStackDeveloper,
    #[serde(rename = "DevOps Engineer")]
    DevOpsEngineer,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Product Manager")]
    ProductManager,
    #[serde(rename = "UI/UX Designer")]
    UiUxDesigner,
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
}

impl JobRole {
    pub const ALL: [JobRole; 8] = [
        JobRole::FrontendDeveloper,
        JobRole::BackendDeveloper,
        JobRole::FullStackDeveloper,
        JobRole::DevOpsEngineer,
        JobRole::DataScientist,
        JobRole::ProductManager,
        JobRole::UiUxDesigner,
        JobRole::SoftwareEngineer,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobRole::FrontendDeveloper => "Frontend Developer",
            JobRole::BackendDeveloper => "Backend Developer",
            JobRole::FullStackDeveloper => "Full Stack Developer",
            JobRole::DevOpsEngineer => "DevOps Engineer",
            JobRole::DataScientist => "Data Scientist",
            JobRole::ProductManager => "Product Manager",
            JobRole::UiUxDesigner => "UI/UX Designer",
            JobRole::SoftwareEngineer => "Software Engineer",
        }
    }
}

impl fmt::Display for JobRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobRole {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim())
            .ok_or_else(|| ParseCatalogError::new("role", s))
    }
}

//
// ─── CATEGORIES ────────────────────────────────────────────────────────────────
//

/// Category of a whole session. `Mixed` sessions combine question categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionCategory {
    Technical,
    Behavioral,
    #[serde(rename = "System Design")]
    SystemDesign,
    #[serde(rename = "DSA")]
    Dsa,
    Mixed,
}

impl SessionCategory {
    pub const ALL: [SessionCategory; 5] = [
        SessionCategory::Technical,
        SessionCategory::Behavioral,
        SessionCategory::SystemDesign,
        SessionCategory::Dsa,
        SessionCategory::Mixed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionCategory::Technical => "Technical",
            SessionCategory::Behavioral => "Behavioral",
            SessionCategory::SystemDesign => "System Design",
            SessionCategory::Dsa => "DSA",
            SessionCategory::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for SessionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionCategory {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| ParseCatalogError::new("session category", s))
    }
}

impl From<SessionCategory> for QuestionCategory {
    /// Questions asked in a `Mixed` session are filed as `General`.
    fn from(category: SessionCategory) -> Self {
        match category {
            SessionCategory::Technical => QuestionCategory::Technical,
            SessionCategory::Behavioral => QuestionCategory::Behavioral,
            SessionCategory::SystemDesign => QuestionCategory::SystemDesign,
            SessionCategory::Dsa => QuestionCategory::Dsa,
            SessionCategory::Mixed => QuestionCategory::General,
        }
    }
}

/// Category of a single answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionCategory {
    Technical,
    Behavioral,
    #[serde(rename = "System Design")]
    SystemDesign,
    #[serde(rename = "DSA")]
    Dsa,
    General,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 5] = [
        QuestionCategory::Technical,
        QuestionCategory::Behavioral,
        QuestionCategory::SystemDesign,
        QuestionCategory::Dsa,
        QuestionCategory::General,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCategory::Technical => "Technical",
            QuestionCategory::Behavioral => "Behavioral",
            QuestionCategory::SystemDesign => "System Design",
            QuestionCategory::Dsa => "DSA",
            QuestionCategory::General => "General",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionCategory {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| ParseCatalogError::new("question category", s))
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Question difficulty. Accepts the lowercase spelling used by generated questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseCatalogError::new("difficulty", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_display_name() {
        for role in JobRole::ALL {
            assert_eq!(role.as_str().parse::<JobRole>().unwrap(), role);
        }
        assert!("Astronaut".parse::<JobRole>().is_err());
    }

    #[test]
    fn categories_use_spaced_names() {
        assert_eq!(SessionCategory::SystemDesign.to_string(), "System Design");
        assert_eq!(
            "DSA".parse::<QuestionCategory>().unwrap(),
            QuestionCategory::Dsa
        );
        assert!("Mixed".parse::<QuestionCategory>().is_err());
        assert_eq!(
            QuestionCategory::from(SessionCategory::Mixed),
            QuestionCategory::General
        );
    }

    #[test]
    fn difficulty_accepts_lowercase_json() {
        let parsed: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(parsed, Difficulty::Hard);
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"Easy\"");
    }
}
