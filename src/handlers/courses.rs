//! # Course Handlers
//!
//! Course catalogue. Prices are monthly, exact decimals, never negative.

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::{ApiJson, Created, EntityId};
use crate::error::ApiError;
use crate::models::course;
use crate::server::AppState;
use crate::services::{ValidationError, courses, courses::CourseInput};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseRequest {
    #[schema(example = "English B1")]
    pub name: String,
    pub description: Option<String>,
    /// Accepts a JSON number or a decimal string
    #[schema(value_type = Option<f64>, example = 1200.50)]
    pub monthly_price: Option<Decimal>,
}

impl TryFrom<CourseRequest> for CourseInput {
    type Error = ValidationError;

    fn try_from(request: CourseRequest) -> Result<Self, Self::Error> {
        let monthly_price = request.monthly_price.ok_or(ValidationError::Required {
            field: "monthlyPrice",
        })?;

        Ok(Self {
            name: request.name,
            description: request.description,
            monthly_price,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64, example = 1200.50)]
    pub monthly_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<course::Model> for CourseResponse {
    fn from(model: course::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            monthly_price: model.monthly_price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// List courses ordered by name
#[utoipa::path(
    get,
    path = "/api/courses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All courses", body = [CourseResponse]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = courses::list(&state.db).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Fetch one course
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found", body = ApiError)
    ),
    tag = "courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<CourseResponse>, ApiError> {
    Ok(Json(courses::get(&state.db, id).await?.into()))
}

/// Add a course to the catalogue
#[utoipa::path(
    post,
    path = "/api/courses",
    security(("bearer_auth" = [])),
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CourseRequest>,
) -> Result<Created<CourseResponse>, ApiError> {
    let input = CourseInput::try_from(request)?;
    let course = courses::create(&state.db, &input).await?;

    Ok(Created {
        location: format!("/api/courses/{}", course.id),
        body: course.into(),
    })
}

/// Replace a course's fields
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Course id")),
    request_body = CourseRequest,
    responses(
        (status = 204, description = "Course updated"),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Course not found", body = ApiError)
    ),
    tag = "courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ApiJson(request): ApiJson<CourseRequest>,
) -> Result<StatusCode, ApiError> {
    let input = CourseInput::try_from(request)?;
    courses::update(&state.db, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a course nobody is enrolled in
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found", body = ApiError),
        (status = 409, description = "Course has enrollments", body = ApiError)
    ),
    tag = "courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    courses::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
