//! Course entity model
//!
//! This module contains the SeaORM entity model for the courses table.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::{DateTimeWithTimeZone, Decimal};

/// Course offered by the school, billed monthly
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Unique identifier for the course (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the course
    pub name: String,

    /// Optional free-form description (never an empty string)
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Monthly tuition, always non-negative
    #[sea_orm(column_type = "Decimal(None)")]
    pub monthly_price: Decimal,

    /// Timestamp when the course was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
