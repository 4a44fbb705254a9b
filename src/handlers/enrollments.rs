//! # Enrollment Handlers
//!
//! Enroll students in courses, end enrollments, and purge them.

use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::types::{ApiJson, ApiQuery, Created, EntityId};
use crate::error::{ApiError, validation_error};
use crate::models::enrollment;
use crate::repositories::EnrollmentFilter;
use crate::server::AppState;
use crate::services::enrollments;

/// Query parameters for listing enrollments
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEnrollmentsQuery {
    /// Only enrollments of this student
    pub student_id: Option<Uuid>,
    /// Only enrollments in this course
    pub course_id: Option<Uuid>,
    /// Hide ended enrollments (default: false)
    pub active_only: Option<bool>,
}

impl From<ListEnrollmentsQuery> for EnrollmentFilter {
    fn from(query: ListEnrollmentsQuery) -> Self {
        Self {
            student_id: query.student_id,
            course_id: query.course_id,
            active_only: query.active_only.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrollmentRequest {
    pub student_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EndEnrollmentRequest {
    /// Defaults to the current time
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<enrollment::Model> for EnrollmentResponse {
    fn from(model: enrollment::Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            course_id: model.course_id,
            start_date: model.start_date.with_timezone(&Utc),
            end_date: model.end_date.map(|date| date.with_timezone(&Utc)),
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// List enrollments, newest start date first
#[utoipa::path(
    get,
    path = "/api/enrollments",
    security(("bearer_auth" = [])),
    params(ListEnrollmentsQuery),
    responses(
        (status = 200, description = "Matching enrollments", body = [EnrollmentResponse]),
        (status = 400, description = "Malformed query string", body = ApiError)
    ),
    tag = "enrollments"
)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListEnrollmentsQuery>,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let filter = EnrollmentFilter::from(query);
    let rows = enrollments::list(&state.db, &filter).await?;
    Ok(Json(rows.into_iter().map(EnrollmentResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Enrollment found", body = EnrollmentResponse),
        (status = 404, description = "Enrollment not found", body = ApiError)
    ),
    tag = "enrollments"
)]
pub async fn get_enrollment(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    Ok(Json(enrollments::get(&state.db, id).await?.into()))
}

/// Enroll a student in a course
#[utoipa::path(
    post,
    path = "/api/enrollments",
    security(("bearer_auth" = [])),
    request_body = EnrollmentRequest,
    responses(
        (status = 201, description = "Enrollment created", body = EnrollmentResponse),
        (status = 400, description = "Missing or unknown student/course", body = ApiError),
        (status = 409, description = "Student already actively enrolled", body = ApiError)
    ),
    tag = "enrollments"
)]
pub async fn create_enrollment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EnrollmentRequest>,
) -> Result<Created<EnrollmentResponse>, ApiError> {
    let created = enrollments::create(&state.db, request.student_id, request.course_id).await?;

    Ok(Created {
        location: format!("/api/enrollments/{}", created.id),
        body: created.into(),
    })
}

/// End an active enrollment. The body is optional.
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/end",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Enrollment id")),
    request_body(content = Option<EndEnrollmentRequest>, description = "Optional end date"),
    responses(
        (status = 204, description = "Enrollment ended"),
        (status = 400, description = "Enrollment already ended", body = ApiError),
        (status = 404, description = "Enrollment not found", body = ApiError)
    ),
    tag = "enrollments"
)]
pub async fn end_enrollment(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let request = parse_end_request(&body)?;
    enrollments::end(&state.db, id, request.end_date).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_end_request(body: &[u8]) -> Result<EndEnrollmentRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EndEnrollmentRequest::default());
    }

    serde_json::from_slice(body).map_err(|error| {
        validation_error(
            "Invalid request body",
            json!({ "field": "endDate", "rule": "format", "reason": error.to_string() }),
        )
    })
}

/// Delete an enrollment in any state
#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Enrollment id")),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 404, description = "Enrollment not found", body = ApiError)
    ),
    tag = "enrollments"
)]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    enrollments::purge(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
