//! # Error Handling
//!
//! This module provides unified error handling for the back office API,
//! implementing a consistent problem+json response format with trace ID propagation.

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::services::{ServiceError, ValidationError};
use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Extract current trace ID from the active request scope (falls back to generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                let simple = uuid::Uuid::new_v4().simple().to_string();
                let short: String = simple.chars().take(8).collect();
                Some(format!("corr-{short}").into_boxed_str())
            })
    }
}

/// Kind of integrity violation reported by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintViolation {
    Unique,
    ForeignKey,
}

fn constraint_violation(error: &sea_orm::DbErr) -> Option<ConstraintViolation> {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const PG_FOREIGN_KEY: &str = "23503";
    const SQLITE_UNIQUE_CODES: &[&str] = &["1555", "2067"];
    const SQLITE_FOREIGN_KEY: &str = "787";

    let runtime_err = match error {
        sea_orm::DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return None,
    };

    let db_error = runtime_err.as_database_error()?;

    if db_error.is_unique_violation() {
        return Some(ConstraintViolation::Unique);
    }
    if db_error.is_foreign_key_violation() {
        return Some(ConstraintViolation::ForeignKey);
    }

    let code = db_error.code()?;
    let code_str = code.as_ref();
    if code_str == PG_UNIQUE || SQLITE_UNIQUE_CODES.contains(&code_str) {
        Some(ConstraintViolation::Unique)
    } else if code_str == PG_FOREIGN_KEY || code_str == SQLITE_FOREIGN_KEY {
        Some(ConstraintViolation::ForeignKey)
    } else {
        None
    }
}

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique index rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(#[source] sea_orm::DbErr),
    /// A foreign key rejected the write or delete.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(#[source] sea_orm::DbErr),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[source] sea_orm::DbErr),
}

impl RepositoryError {
    /// Classify a SeaORM error, recognising integrity violations.
    pub fn database_error(error: sea_orm::DbErr) -> Self {
        match constraint_violation(&error) {
            Some(ConstraintViolation::Unique) => Self::UniqueViolation(error),
            Some(ConstraintViolation::ForeignKey) => Self::ForeignKeyViolation(error),
            None => Self::Database(error),
        }
    }
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(error: sea_orm::DbErr) -> Self {
        Self::database_error(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        (self.status, headers, axum::Json(self)).into_response()
    }
}

// Error mappers for common sources

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:?}", error);

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        RepositoryError::database_error(error).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::UniqueViolation(error) => {
                tracing::debug!(?error, "Unique constraint violation detected");
                Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists")
            }
            RepositoryError::ForeignKeyViolation(error) => {
                tracing::debug!(?error, "Foreign key violation detected");
                Self::new(
                    StatusCode::CONFLICT,
                    "REFERENCED_BY_OTHER_RECORDS",
                    "Resource is referenced by other records",
                )
            }
            RepositoryError::Database(sea_orm::DbErr::Conn(connection_err)) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            RepositoryError::Database(error) => {
                tracing::error!("Database error: {:?}", error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        validation_error(
            &error.to_string(),
            json!({ "field": error.field(), "rule": error.rule() }),
        )
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(error) => error.into(),
            ServiceError::NotFound { entity, id } => ApiError::new(
                StatusCode::NOT_FOUND,
                format!("{}_NOT_FOUND", entity.to_uppercase()),
                format!("{} not found", capitalize(entity)),
            )
            .with_details(json!({ "id": id.to_string() })),
            ServiceError::Conflict { code, message } => {
                ApiError::new(StatusCode::CONFLICT, code.to_string(), message)
            }
            ServiceError::EnrollmentAlreadyEnded { id } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "ENROLLMENT_ALREADY_ENDED",
                "Enrollment has already ended",
            )
            .with_details(json!({ "id": id.to_string() })),
            ServiceError::InvalidCredentials => unauthorized(Some("Invalid credentials")),
            ServiceError::Repository(error) => error.into(),
            ServiceError::Internal(error) => error.into(),
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Create an unauthorized error (401)
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// Create a forbidden error (403)
pub fn forbidden(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Insufficient permissions");
    ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg)
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}
