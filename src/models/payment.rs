//! Payment entity model
//!
//! This module contains the SeaORM entity model for the payments table.
//! Payments reference a student only; they are never tied to an enrollment.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::{DateTimeWithTimeZone, Decimal};

use super::student::Entity as Student;

/// Monetary transaction recorded for a student
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Paying student
    pub student_id: Uuid,

    /// Amount paid, strictly positive
    #[sea_orm(column_type = "Decimal(None)")]
    pub amount: Decimal,

    /// Upper-cased three letter currency code
    pub currency: String,

    /// Optional notes (never an empty string)
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    /// Instant the payment was recorded; drives the monthly reports
    pub paid_at: DateTimeWithTimeZone,

    /// Timestamp when the payment row was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Student",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_delete = "Restrict"
    )]
    Student,
}

impl Related<Student> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
