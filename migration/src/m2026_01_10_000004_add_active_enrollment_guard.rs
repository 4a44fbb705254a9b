//! Adds a partial unique index allowing at most one active enrollment per
//! (student, course) pair.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

const ACTIVE_PAIR_GUARD_PG: &str = r#"
DO $$
BEGIN
    IF NOT EXISTS (
        SELECT 1 FROM pg_indexes
        WHERE schemaname = current_schema()
          AND indexname = 'ux_enrollments_active_pair'
    ) THEN
        CREATE UNIQUE INDEX ux_enrollments_active_pair
            ON enrollments (student_id, course_id)
            WHERE is_active;
    END IF;
END
$$;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        match backend {
            DatabaseBackend::Postgres => {
                manager
                    .get_connection()
                    .execute(Statement::from_string(backend, ACTIVE_PAIR_GUARD_PG))
                    .await
                    .map(|_| ())
            }
            _ => manager
                .get_connection()
                .execute(Statement::from_string(
                    backend,
                    "CREATE UNIQUE INDEX IF NOT EXISTS ux_enrollments_active_pair \
                     ON enrollments (student_id, course_id) \
                     WHERE is_active"
                        .to_string(),
                ))
                .await
                .map(|_| ()),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "DROP INDEX IF EXISTS ux_enrollments_active_pair",
            ))
            .await
            .map(|_| ())
    }
}
