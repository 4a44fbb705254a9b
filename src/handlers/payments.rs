//! # Payment Handlers
//!
//! Record tuition payments. Payments are immutable once stored; a mistaken
//! payment is deleted and recorded again.

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::types::{ApiJson, ApiQuery, Created, EntityId};
use crate::error::ApiError;
use crate::models::payment;
use crate::server::AppState;
use crate::services::{ValidationError, payments, payments::PaymentInput};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPaymentsQuery {
    /// Only payments made by this student
    pub student_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRequest {
    pub student_id: Option<Uuid>,
    /// Accepts a JSON number or a decimal string
    #[schema(value_type = Option<f64>, example = 150.00)]
    pub amount: Option<Decimal>,
    /// ISO 4217 code, defaults to MXN
    #[schema(example = "MXN")]
    pub currency: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<PaymentRequest> for PaymentInput {
    type Error = ValidationError;

    fn try_from(request: PaymentRequest) -> Result<Self, Self::Error> {
        let amount = request
            .amount
            .ok_or(ValidationError::Required { field: "amount" })?;

        Ok(Self {
            student_id: request.student_id,
            amount,
            currency: request.currency,
            notes: request.notes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64, example = 150.00)]
    pub amount: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<payment::Model> for PaymentResponse {
    fn from(model: payment::Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            amount: model.amount,
            currency: model.currency,
            notes: model.notes,
            paid_at: model.paid_at.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// List payments, newest first
#[utoipa::path(
    get,
    path = "/api/payments",
    security(("bearer_auth" = [])),
    params(ListPaymentsQuery),
    responses(
        (status = 200, description = "Matching payments", body = [PaymentResponse]),
        (status = 400, description = "Malformed query string", body = ApiError)
    ),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let rows = payments::list(&state.db, query.student_id).await?;
    Ok(Json(rows.into_iter().map(PaymentResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment found", body = PaymentResponse),
        (status = 404, description = "Payment not found", body = ApiError)
    ),
    tag = "payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<PaymentResponse>, ApiError> {
    Ok(Json(payments::get(&state.db, id).await?.into()))
}

/// Record a payment made now
#[utoipa::path(
    post,
    path = "/api/payments",
    security(("bearer_auth" = [])),
    request_body = PaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentResponse),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> Result<Created<PaymentResponse>, ApiError> {
    let input = PaymentInput::try_from(request)?;
    let recorded = payments::record(&state.db, &input).await?;

    Ok(Created {
        location: format!("/api/payments/{}", recorded.id),
        body: recorded.into(),
    })
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Payment id")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found", body = ApiError)
    ),
    tag = "payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    payments::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
