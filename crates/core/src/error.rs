use thiserror::Error;

use crate::model::{ParseCatalogError, ParseIdError, QuestionError, RoleError, SessionDraftError};

/// Any validation failure raised by the domain layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionDraftError),
    #[error(transparent)]
    Role(#[from] RoleError),
    #[error(transparent)]
    Catalog(#[from] ParseCatalogError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
