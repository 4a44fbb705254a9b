//! # Server Configuration
//!
//! Router assembly, middleware stack, OpenAPI document, and the serve loop
//! for the back office API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{RouteGroup, auth_middleware, role_guard};
use crate::config::AppConfig;
use crate::handlers::{self, courses, enrollments, payments, reports, students, teachers};
use crate::services::session::SessionIssuer;
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
    pub sessions: Arc<SessionIssuer>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let sessions = SessionIssuer::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            sessions: Arc::new(sessions),
        })
    }
}

fn guarded(state: &AppState, group: RouteGroup, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        (Arc::clone(&state.config), group),
        role_guard,
    ))
}

fn course_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
}

fn student_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/students/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
}

fn teacher_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/teachers",
            get(teachers::list_teachers).post(teachers::create_teacher),
        )
        .route(
            "/teachers/{id}",
            get(teachers::get_teacher)
                .put(teachers::update_teacher)
                .delete(teachers::delete_teacher),
        )
}

fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/enrollments",
            get(enrollments::list_enrollments).post(enrollments::create_enrollment),
        )
        .route(
            "/enrollments/{id}",
            get(enrollments::get_enrollment).delete(enrollments::delete_enrollment),
        )
        .route("/enrollments/{id}/end", post(enrollments::end_enrollment))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/payments/{id}",
            get(payments::get_payment).delete(payments::delete_payment),
        )
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reports/payments/monthly",
            get(reports::monthly_payments),
        )
        .route(
            "/reports/payments/monthly-by-student",
            get(reports::monthly_payments_by_student),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/me", get(handlers::auth::me))
        .merge(guarded(&state, RouteGroup::Courses, course_routes()))
        .merge(guarded(&state, RouteGroup::Students, student_routes()))
        .merge(guarded(&state, RouteGroup::Teachers, teacher_routes()))
        .merge(guarded(&state, RouteGroup::Enrollments, enrollment_routes()))
        .merge(guarded(&state, RouteGroup::Payments, payment_routes()))
        .merge(guarded(&state, RouteGroup::Reports, report_routes()))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/health", get(handlers::health))
        .merge(authenticated);

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(telemetry::trace_id_middleware))
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::courses::list_courses,
        crate::handlers::courses::get_course,
        crate::handlers::courses::create_course,
        crate::handlers::courses::update_course,
        crate::handlers::courses::delete_course,
        crate::handlers::students::list_students,
        crate::handlers::students::get_student,
        crate::handlers::students::create_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::teachers::list_teachers,
        crate::handlers::teachers::get_teacher,
        crate::handlers::teachers::create_teacher,
        crate::handlers::teachers::update_teacher,
        crate::handlers::teachers::delete_teacher,
        crate::handlers::enrollments::list_enrollments,
        crate::handlers::enrollments::get_enrollment,
        crate::handlers::enrollments::create_enrollment,
        crate::handlers::enrollments::end_enrollment,
        crate::handlers::enrollments::delete_enrollment,
        crate::handlers::payments::list_payments,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::delete_payment,
        crate::handlers::reports::monthly_payments,
        crate::handlers::reports::monthly_payments_by_student,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::MeResponse,
            crate::handlers::types::PersonRequest,
            crate::handlers::types::PersonResponse,
            crate::handlers::courses::CourseRequest,
            crate::handlers::courses::CourseResponse,
            crate::handlers::enrollments::EnrollmentRequest,
            crate::handlers::enrollments::EndEnrollmentRequest,
            crate::handlers::enrollments::EnrollmentResponse,
            crate::handlers::payments::PaymentRequest,
            crate::handlers::payments::PaymentResponse,
            crate::handlers::reports::MonthlyPaymentsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin login"),
        (name = "courses", description = "Course catalogue"),
        (name = "students", description = "Student roster"),
        (name = "teachers", description = "Teacher roster"),
        (name = "enrollments", description = "Student enrollments in courses"),
        (name = "payments", description = "Tuition payments"),
        (name = "reports", description = "Monthly payment reports")
    ),
    info(
        title = "Language School Back Office API",
        description = "Students, teachers, courses, enrollments and payments",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` JWT scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
