//! # Authentication and Authorization
//!
//! Bearer JWT authentication for the `/api` surface plus a per-route-group
//! role guard. Which groups demand the admin role is configuration
//! (`BACKOFFICE_ADMIN_ONLY_GROUPS`).

use std::{fmt, str::FromStr, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, unauthorized};
use crate::server::AppState;
use crate::services::session::{ADMIN_ROLE, AdminClaims, SessionIssuer};

/// Named slices of the API that can be placed behind the admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteGroup {
    Courses,
    Students,
    Teachers,
    Enrollments,
    Payments,
    Reports,
}

impl RouteGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteGroup::Courses => "courses",
            RouteGroup::Students => "students",
            RouteGroup::Teachers => "teachers",
            RouteGroup::Enrollments => "enrollments",
            RouteGroup::Payments => "payments",
            RouteGroup::Reports => "reports",
        }
    }
}

impl fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRouteGroup(pub String);

impl FromStr for RouteGroup {
    type Err = UnknownRouteGroup;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "courses" => Ok(RouteGroup::Courses),
            "students" => Ok(RouteGroup::Students),
            "teachers" => Ok(RouteGroup::Teachers),
            "enrollments" => Ok(RouteGroup::Enrollments),
            "payments" => Ok(RouteGroup::Payments),
            "reports" => Ok(RouteGroup::Reports),
            _ => Err(UnknownRouteGroup(value.to_string())),
        }
    }
}

/// Authenticated caller, available to handlers as an extractor.
#[derive(Debug, Clone)]
pub struct AdminPrincipal {
    pub claims: AdminClaims,
}

impl AdminPrincipal {
    pub fn name(&self) -> &str {
        &self.claims.name
    }

    pub fn roles(&self) -> Vec<String> {
        vec![self.claims.role.clone()]
    }

    pub fn is_admin(&self) -> bool {
        self.claims.has_role(ADMIN_ROLE)
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

impl FromRef<AppState> for Arc<SessionIssuer> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.sessions)
    }
}

/// Authentication middleware that validates the bearer JWT.
pub async fn auth_middleware(
    State(sessions): State<Arc<SessionIssuer>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = sessions.validate(token).map_err(|error| {
        tracing::debug!(%error, "Rejected bearer token");
        unauthorized(Some("Invalid or expired token"))
    })?;

    request
        .extensions_mut()
        .insert(AdminPrincipal { claims });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

/// Role guard for one route group. Must run after [`auth_middleware`].
pub async fn role_guard(
    State((config, group)): State<(Arc<AppConfig>, RouteGroup)>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<AdminPrincipal>()
        .ok_or_else(|| unauthorized(None))?;

    if config.requires_admin(group) && !principal.is_admin() {
        tracing::warn!(group = %group, role = %principal.claims.role, "Role guard denied request");
        return Err(forbidden(None));
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminPrincipal>()
            .cloned()
            .ok_or_else(|| unauthorized(None))
    }
}
