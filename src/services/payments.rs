//! Payment recording.

use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::validation::{self, ValidationError};
use super::{ServiceError, ServiceResult};
use crate::models::payment;
use crate::repositories::{NewPayment, PaymentRepository, StudentRepository};

const ENTITY: &str = "payment";

#[derive(Debug, Clone, Default)]
pub struct PaymentInput {
    pub student_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

/// Record a payment received now. No enrollment is required.
pub async fn record(db: &DatabaseConnection, input: &PaymentInput) -> ServiceResult<payment::Model> {
    let student_id = validation::reference("studentId", input.student_id)?;
    let amount = validation::payment_amount(input.amount)?;

    if !StudentRepository::new(db).exists(student_id).await? {
        return Err(ValidationError::UnknownReference { field: "studentId" }.into());
    }

    let recorded = PaymentRepository::new(db)
        .create(NewPayment {
            student_id,
            amount,
            currency: validation::currency(input.currency.as_deref()),
            notes: validation::optional_text(input.notes.as_deref()),
        })
        .await?;

    counter!("payments_recorded_total", "currency" => recorded.currency.clone()).increment(1);
    tracing::info!(
        payment_id = %recorded.id,
        %student_id,
        amount = %recorded.amount,
        currency = %recorded.currency,
        "Payment recorded"
    );
    Ok(recorded)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<payment::Model> {
    PaymentRepository::new(db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(ENTITY, id))
}

/// Payments newest first, optionally for one student.
pub async fn list(
    db: &DatabaseConnection,
    student_id: Option<Uuid>,
) -> ServiceResult<Vec<payment::Model>> {
    Ok(PaymentRepository::new(db).list(student_id).await?)
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
    if !PaymentRepository::new(db).delete(id).await? {
        return Err(ServiceError::not_found(ENTITY, id));
    }

    tracing::info!(payment_id = %id, "Payment deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn amount(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn id_row(id: Uuid) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::from(id))])
    }

    fn stored(student_id: Uuid, value: Decimal, currency: &str) -> payment::Model {
        let now = Utc::now();
        payment::Model {
            id: Uuid::new_v4(),
            student_id,
            amount: value,
            currency: currency.to_string(),
            notes: None,
            paid_at: now.into(),
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn record_defaults_currency_and_drops_blank_notes() {
        let student_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(student_id)]])
            .append_query_results([vec![stored(student_id, amount("150.00"), "MXN")]])
            .into_connection();

        let recorded = record(
            &db,
            &PaymentInput {
                student_id: Some(student_id),
                amount: amount("150.00"),
                currency: None,
                notes: Some("   ".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(recorded.currency, "MXN");
        assert_eq!(recorded.amount, amount("150.00"));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("MXN"));
    }

    #[tokio::test]
    async fn record_uppercases_currency() {
        let student_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(student_id)]])
            .append_query_results([vec![stored(student_id, amount("20"), "USD")]])
            .into_connection();

        record(
            &db,
            &PaymentInput {
                student_id: Some(student_id),
                amount: amount("20"),
                currency: Some(" usd ".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("\"USD\""));
    }

    #[tokio::test]
    async fn record_writes_sub_cent_amount_unrounded() {
        let student_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(student_id)]])
            .append_query_results([vec![stored(student_id, amount("0.004"), "MXN")]])
            .into_connection();

        let recorded = record(
            &db,
            &PaymentInput {
                student_id: Some(student_id),
                amount: amount("0.004"),
                currency: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(recorded.amount, amount("0.004"));
        assert!(recorded.amount > Decimal::ZERO);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("0.004"));
    }

    #[tokio::test]
    async fn record_accepts_amount_beyond_twelve_digits() {
        let student_id = Uuid::new_v4();
        let large = amount("100000000000.50");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(student_id)]])
            .append_query_results([vec![stored(student_id, large, "MXN")]])
            .into_connection();

        let recorded = record(
            &db,
            &PaymentInput {
                student_id: Some(student_id),
                amount: large,
                currency: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(recorded.amount.to_string(), "100000000000.50");
    }

    #[tokio::test]
    async fn record_rejects_zero_amount_before_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let error = record(
            &db,
            &PaymentInput {
                student_id: Some(Uuid::new_v4()),
                amount: Decimal::ZERO,
                currency: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Validation(ValidationError::NonPositiveAmount)
        ));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn record_rejects_unknown_student() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&'static str, Value>>::new()])
            .into_connection();

        let error = record(
            &db,
            &PaymentInput {
                student_id: Some(Uuid::new_v4()),
                amount: amount("10"),
                currency: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Validation(ValidationError::UnknownReference { field: "studentId" })
        ));
    }
}
