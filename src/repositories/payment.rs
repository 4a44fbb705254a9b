//! # Payment Repository

use crate::error::RepositoryError;
use crate::models::payment::{
    self, ActiveModel as PaymentActiveModel, Entity as Payment, Model as PaymentModel,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::{DateTimeWithTimeZone, Decimal};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Normalized payment ready for insertion.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub student_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub notes: Option<String>,
}

/// The two columns the monthly reports aggregate over.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct PaymentPoint {
    pub paid_at: DateTimeWithTimeZone,
    pub amount: Decimal,
}

/// Repository for Payment database operations
pub struct PaymentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PaymentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a payment stamped with the current instant.
    pub async fn create(&self, new_payment: NewPayment) -> Result<PaymentModel, RepositoryError> {
        let now = Utc::now();
        let payment = PaymentActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(new_payment.student_id),
            amount: Set(new_payment.amount),
            currency: Set(new_payment.currency),
            notes: Set(new_payment.notes),
            paid_at: Set(now.into()),
            created_at: Set(now.into()),
        };

        payment
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentModel>, RepositoryError> {
        Payment::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Payments newest first, optionally for a single student.
    pub async fn list(&self, student_id: Option<Uuid>) -> Result<Vec<PaymentModel>, RepositoryError> {
        let mut query = Payment::find();

        if let Some(student_id) = student_id {
            query = query.filter(payment::Column::StudentId.eq(student_id));
        }

        query
            .order_by_desc(payment::Column::PaidAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = Payment::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }

    /// `(paid_at, amount)` pairs, optionally narrowed to one student and to
    /// the half-open window `[from, to)`.
    pub async fn points(
        &self,
        student_id: Option<Uuid>,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<PaymentPoint>, RepositoryError> {
        let mut query = Payment::find()
            .select_only()
            .column(payment::Column::PaidAt)
            .column(payment::Column::Amount);

        if let Some(student_id) = student_id {
            query = query.filter(payment::Column::StudentId.eq(student_id));
        }
        if let Some((from, to)) = window {
            let from: DateTimeWithTimeZone = from.into();
            let to: DateTimeWithTimeZone = to.into();
            query = query
                .filter(payment::Column::PaidAt.gte(from))
                .filter(payment::Column::PaidAt.lt(to));
        }

        query
            .into_model::<PaymentPoint>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
