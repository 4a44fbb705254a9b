//! Teacher roster endpoints. Same shape as students.

use axum::{extract::State, http::StatusCode, response::Json};

use super::types::{ApiJson, Created, EntityId, PersonRequest, PersonResponse};
use crate::error::ApiError;
use crate::server::AppState;
use crate::services::people::{self, Roster};

#[utoipa::path(
    get,
    path = "/api/teachers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All teachers", body = [PersonResponse]),
        (status = 403, description = "Admin role required", body = ApiError)
    ),
    tag = "teachers"
)]
pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonResponse>>, ApiError> {
    let teachers = people::list(&state.db, Roster::Teachers).await?;
    Ok(Json(teachers.into_iter().map(PersonResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher found", body = PersonResponse),
        (status = 404, description = "Teacher not found", body = ApiError)
    ),
    tag = "teachers"
)]
pub async fn get_teacher(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<PersonResponse>, ApiError> {
    let teacher = people::get(&state.db, Roster::Teachers, id).await?;
    Ok(Json(teacher.into()))
}

#[utoipa::path(
    post,
    path = "/api/teachers",
    security(("bearer_auth" = [])),
    request_body = PersonRequest,
    responses(
        (status = 201, description = "Teacher created", body = PersonResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "teachers"
)]
pub async fn create_teacher(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PersonRequest>,
) -> Result<Created<PersonResponse>, ApiError> {
    let teacher = people::create(&state.db, Roster::Teachers, &request.into()).await?;

    Ok(Created {
        location: format!("/api/teachers/{}", teacher.id),
        body: teacher.into(),
    })
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Teacher id")),
    request_body = PersonRequest,
    responses(
        (status = 204, description = "Teacher updated"),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Teacher not found", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "teachers"
)]
pub async fn update_teacher(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ApiJson(request): ApiJson<PersonRequest>,
) -> Result<StatusCode, ApiError> {
    people::update(&state.db, Roster::Teachers, id, &request.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Teacher id")),
    responses(
        (status = 204, description = "Teacher deleted"),
        (status = 404, description = "Teacher not found", body = ApiError)
    ),
    tag = "teachers"
)]
pub async fn delete_teacher(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    people::delete(&state.db, Roster::Teachers, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
