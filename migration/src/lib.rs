//! Database migrations for the back office API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2026_01_10_000001_create_people;
mod m2026_01_10_000002_create_courses;
mod m2026_01_10_000003_create_enrollments_and_payments;
mod m2026_01_10_000004_add_active_enrollment_guard;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_01_10_000001_create_people::Migration),
            Box::new(m2026_01_10_000002_create_courses::Migration),
            Box::new(m2026_01_10_000003_create_enrollments_and_payments::Migration),
            Box::new(m2026_01_10_000004_add_active_enrollment_guard::Migration),
        ]
    }
}
