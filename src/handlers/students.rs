//! # Student Handlers
//!
//! CRUD over the student roster. Emails are unique per roster.

use axum::{extract::State, http::StatusCode, response::Json};

use super::types::{ApiJson, Created, EntityId, PersonRequest, PersonResponse};
use crate::error::ApiError;
use crate::server::AppState;
use crate::services::people::{self, Roster};

/// List students ordered by last name, then first name
#[utoipa::path(
    get,
    path = "/api/students",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All students", body = [PersonResponse]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Admin role required", body = ApiError)
    ),
    tag = "students"
)]
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonResponse>>, ApiError> {
    let students = people::list(&state.db, Roster::Students).await?;
    Ok(Json(students.into_iter().map(PersonResponse::from).collect()))
}

/// Fetch one student
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student found", body = PersonResponse),
        (status = 404, description = "Student not found", body = ApiError)
    ),
    tag = "students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<PersonResponse>, ApiError> {
    let student = people::get(&state.db, Roster::Students, id).await?;
    Ok(Json(student.into()))
}

/// Register a student
#[utoipa::path(
    post,
    path = "/api/students",
    security(("bearer_auth" = [])),
    request_body = PersonRequest,
    responses(
        (status = 201, description = "Student created", body = PersonResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PersonRequest>,
) -> Result<Created<PersonResponse>, ApiError> {
    let student = people::create(&state.db, Roster::Students, &request.into()).await?;

    Ok(Created {
        location: format!("/api/students/{}", student.id),
        body: student.into(),
    })
}

/// Replace a student's fields
#[utoipa::path(
    put,
    path = "/api/students/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Student id")),
    request_body = PersonRequest,
    responses(
        (status = 204, description = "Student updated"),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Student not found", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "students"
)]
pub async fn update_student(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ApiJson(request): ApiJson<PersonRequest>,
) -> Result<StatusCode, ApiError> {
    people::update(&state.db, Roster::Students, id, &request.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a student without enrollments or payments
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Student id")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found", body = ApiError),
        (status = 409, description = "Student is still referenced", body = ApiError)
    ),
    tag = "students"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    people::delete(&state.db, Roster::Students, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
