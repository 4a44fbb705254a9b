//! # Report Handlers
//!
//! Monthly payment totals, across the school or for one student.

use axum::{extract::State, response::Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::types::ApiQuery;
use crate::error::ApiError;
use crate::server::AppState;
use crate::services::reporting::{self, MonthlyPaymentsReportItem};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MonthlyReportQuery {
    /// Restrict to one calendar year (UTC)
    #[param(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentMonthlyReportQuery {
    /// Student whose payments are totalled (required)
    pub student_id: Option<Uuid>,
    /// Restrict to one calendar year (UTC)
    #[param(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPaymentsResponse {
    #[schema(example = 2026)]
    pub year: i32,
    /// 1 through 12
    #[schema(example = 3)]
    pub month: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64, example = 350.00)]
    pub total_amount: Decimal,
    #[schema(example = 2)]
    pub payments_count: u64,
}

impl From<MonthlyPaymentsReportItem> for MonthlyPaymentsResponse {
    fn from(item: MonthlyPaymentsReportItem) -> Self {
        Self {
            year: item.year,
            month: item.month,
            total_amount: item.total_amount,
            payments_count: item.payments_count,
        }
    }
}

fn into_response(items: Vec<MonthlyPaymentsReportItem>) -> Json<Vec<MonthlyPaymentsResponse>> {
    Json(items.into_iter().map(MonthlyPaymentsResponse::from).collect())
}

/// Payment totals per month, ascending
#[utoipa::path(
    get,
    path = "/api/reports/payments/monthly",
    security(("bearer_auth" = [])),
    params(MonthlyReportQuery),
    responses(
        (status = 200, description = "One row per month with payments", body = [MonthlyPaymentsResponse]),
        (status = 403, description = "Admin role required", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn monthly_payments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MonthlyReportQuery>,
) -> Result<Json<Vec<MonthlyPaymentsResponse>>, ApiError> {
    let items = reporting::monthly(&state.db, query.year).await?;
    Ok(into_response(items))
}

/// Payment totals per month for one student
#[utoipa::path(
    get,
    path = "/api/reports/payments/monthly-by-student",
    security(("bearer_auth" = [])),
    params(StudentMonthlyReportQuery),
    responses(
        (status = 200, description = "One row per month with payments", body = [MonthlyPaymentsResponse]),
        (status = 400, description = "Missing or unknown studentId", body = ApiError),
        (status = 403, description = "Admin role required", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn monthly_payments_by_student(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StudentMonthlyReportQuery>,
) -> Result<Json<Vec<MonthlyPaymentsResponse>>, ApiError> {
    let items = reporting::monthly_by_student(&state.db, query.student_id, query.year).await?;
    Ok(into_response(items))
}
