//! # Authentication Handlers
//!
//! Admin login and the "who am I" endpoint.

use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::ApiJson;
use crate::auth::AdminPrincipal;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// HS256 bearer token
    pub access_token: String,
    pub expires_at_utc: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[schema(example = "admin")]
    pub name: String,
    #[schema(example = json!(["Admin"]))]
    pub roles: Vec<String>,
}

/// Exchange admin credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state
        .sessions
        .login(&state.db, &request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: issued.access_token,
        expires_at_utc: issued.expires_at_utc,
    }))
}

/// Describe the authenticated caller
#[utoipa::path(
    get,
    path = "/api/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Authenticated principal", body = MeResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(principal: AdminPrincipal) -> Json<MeResponse> {
    Json(MeResponse {
        name: principal.name().to_string(),
        roles: principal.roles(),
    })
}
