//! # Domain Services
//!
//! Business rules for the back office: field validation, the people and course
//! catalogues, the enrollment lifecycle, payment recording, reporting and admin
//! sessions. Services sit between the HTTP handlers and the repositories and
//! speak [`ServiceError`].

use thiserror::Error;
use uuid::Uuid;

use crate::error::RepositoryError;

pub mod courses;
pub mod enrollments;
pub mod payments;
pub mod people;
pub mod reporting;
pub mod session;
pub mod validation;

pub use validation::ValidationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{message}")]
    Conflict { code: &'static str, message: String },
    #[error("enrollment {id} has already ended")]
    EnrollmentAlreadyEnded { id: Uuid },
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Map a foreign-key failure on delete to the "still referenced" conflict.
    pub(crate) fn on_delete(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ForeignKeyViolation(_) => Self::Conflict {
                code: "REFERENCED_BY_OTHER_RECORDS",
                message: "Record is referenced by enrollments or payments".to_string(),
            },
            other => Self::Repository(other),
        }
    }
}
