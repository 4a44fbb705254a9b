//! # Common API Types
//!
//! Extractors that turn axum rejections into [`ApiError`] bodies, and the
//! request/response shapes shared by the student and teacher endpoints.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, validation_error};
use crate::services::people::{Person, PersonInput};

/// `{id}` path segment parsed as a UUID.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub Uuid);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                validation_error(
                    "Identifier must be a UUID",
                    json!({ "field": "id", "rule": "uuid_format" }),
                )
            })?;
        Ok(Self(id))
    }
}

/// JSON body whose rejections render as problem+json.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        Ok(Self(value))
    }
}

/// Query string whose rejections render as problem+json.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                validation_error(
                    "Invalid query string",
                    json!({ "field": "query", "rule": "format", "reason": rejection.body_text() }),
                )
            })?;
        Ok(Self(value))
    }
}

/// `201 Created` with a `Location` header and JSON body.
pub struct Created<T> {
    pub location: String,
    pub body: T,
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            [("Location", self.location)],
            Json(self.body),
        )
            .into_response()
    }
}

/// Create/update payload for students and teachers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRequest {
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Pérez")]
    pub last_name: String,
    #[schema(example = "ana@x.com")]
    pub email: String,
}

impl From<PersonRequest> for PersonInput {
    fn from(request: PersonRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Stored lowercase
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            first_name: person.first_name,
            last_name: person.last_name,
            email: person.email,
            created_at: person.created_at,
        }
    }
}
