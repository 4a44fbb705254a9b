//! Enrollment lifecycle.
//!
//! An enrollment starts `Active` and can move to `Ended` exactly once.
//! [`end`] is the soft close that keeps history; [`purge`] removes the row
//! outright and is a separate administrative operation.

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::validation::{self, ValidationError};
use super::{ServiceError, ServiceResult};
use crate::error::RepositoryError;
use crate::models::enrollment;
use crate::repositories::{
    CourseRepository, EnrollmentFilter, EnrollmentRepository, StudentRepository,
};

const ENTITY: &str = "enrollment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentState {
    Active,
    Ended,
}

impl EnrollmentState {
    pub fn of(model: &enrollment::Model) -> Self {
        if model.is_active {
            Self::Active
        } else {
            Self::Ended
        }
    }
}

fn already_active() -> ServiceError {
    ServiceError::Conflict {
        code: "ENROLLMENT_ALREADY_ACTIVE",
        message: "Student already has an active enrollment in this course".to_string(),
    }
}

/// Enroll a student in a course.
///
/// The pre-check gives the common case a clear conflict; the partial unique
/// index on active pairs catches concurrent creates that both pass it.
pub async fn create(
    db: &DatabaseConnection,
    student_id: Option<Uuid>,
    course_id: Option<Uuid>,
) -> ServiceResult<enrollment::Model> {
    let student_id = validation::reference("studentId", student_id)?;
    let course_id = validation::reference("courseId", course_id)?;

    if !StudentRepository::new(db).exists(student_id).await? {
        return Err(ValidationError::UnknownReference { field: "studentId" }.into());
    }
    if !CourseRepository::new(db).exists(course_id).await? {
        return Err(ValidationError::UnknownReference { field: "courseId" }.into());
    }

    let repo = EnrollmentRepository::new(db);
    if repo.has_active(student_id, course_id).await? {
        return Err(already_active());
    }

    let created = repo
        .create_active(student_id, course_id)
        .await
        .map_err(|error| match error {
            RepositoryError::UniqueViolation(_) => already_active(),
            other => other.into(),
        })?;

    counter!("enrollments_created_total").increment(1);
    tracing::info!(
        enrollment_id = %created.id,
        %student_id,
        %course_id,
        "Enrollment created"
    );
    Ok(created)
}

/// Close an active enrollment. `end_date` defaults to now.
pub async fn end(
    db: &DatabaseConnection,
    id: Uuid,
    end_date: Option<DateTime<Utc>>,
) -> ServiceResult<enrollment::Model> {
    let repo = EnrollmentRepository::new(db);
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(ENTITY, id))?;

    if EnrollmentState::of(&existing) == EnrollmentState::Ended {
        return Err(ServiceError::EnrollmentAlreadyEnded { id });
    }

    let end_date = end_date.unwrap_or_else(Utc::now);
    let ended = repo.mark_ended(existing, end_date.into()).await?;

    counter!("enrollments_ended_total").increment(1);
    tracing::info!(enrollment_id = %id, %end_date, "Enrollment ended");
    Ok(ended)
}

/// Remove an enrollment row regardless of its state.
pub async fn purge(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
    if !EnrollmentRepository::new(db).delete(id).await? {
        return Err(ServiceError::not_found(ENTITY, id));
    }

    counter!("enrollments_purged_total").increment(1);
    tracing::info!(enrollment_id = %id, "Enrollment purged");
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<enrollment::Model> {
    EnrollmentRepository::new(db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(ENTITY, id))
}

pub async fn list(
    db: &DatabaseConnection,
    filter: &EnrollmentFilter,
) -> ServiceResult<Vec<enrollment::Model>> {
    Ok(EnrollmentRepository::new(db).list(filter).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn id_row(id: Uuid) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::from(id))])
    }

    fn no_rows() -> Vec<BTreeMap<&'static str, Value>> {
        Vec::new()
    }

    fn enrollment(is_active: bool) -> enrollment::Model {
        enrollment::Model {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            start_date: Utc::now().into(),
            end_date: None,
            is_active,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn create_requires_both_references() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let error = create(&db, Some(Uuid::nil()), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ServiceError::Validation(ValidationError::MissingReference { field: "studentId" })
        ));

        let error = create(&db, Some(Uuid::new_v4()), None).await.unwrap_err();
        assert!(matches!(
            error,
            ServiceError::Validation(ValidationError::MissingReference { field: "courseId" })
        ));
    }

    #[tokio::test]
    async fn create_rejects_unknown_course() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(Uuid::new_v4())]])
            .append_query_results([no_rows()])
            .into_connection();

        let error = create(&db, Some(Uuid::new_v4()), Some(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Validation(ValidationError::UnknownReference { field: "courseId" })
        ));
    }

    #[tokio::test]
    async fn create_rejects_second_active_enrollment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(Uuid::new_v4())]])
            .append_query_results([vec![id_row(Uuid::new_v4())]])
            .append_query_results([vec![id_row(Uuid::new_v4())]])
            .into_connection();

        let error = create(&db, Some(Uuid::new_v4()), Some(Uuid::new_v4()))
            .await
            .unwrap_err();

        match error {
            ServiceError::Conflict { code, .. } => assert_eq!(code, "ENROLLMENT_ALREADY_ACTIVE"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn end_uses_supplied_date() {
        let active = enrollment(true);
        let end_date = Utc.with_ymd_and_hms(2026, 6, 30, 0, 0, 0).unwrap();
        let mut ended = active.clone();
        ended.is_active = false;
        ended.end_date = Some(end_date.into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active.clone()]])
            .append_query_results([vec![ended]])
            .into_connection();

        let result = end(&db, active.id, Some(end_date)).await.unwrap();

        assert_eq!(EnrollmentState::of(&result), EnrollmentState::Ended);
        assert_eq!(result.end_date, Some(end_date.into()));
    }

    #[tokio::test]
    async fn end_twice_is_rejected_without_writing() {
        let ended = enrollment(false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ended.clone()]])
            .into_connection();

        let error = end(&db, ended.id, None).await.unwrap_err();

        assert!(matches!(
            error,
            ServiceError::EnrollmentAlreadyEnded { id } if id == ended.id
        ));
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn end_unknown_enrollment_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<enrollment::Model>::new()])
            .into_connection();

        let error = end(&db, Uuid::new_v4(), None).await.unwrap_err();

        assert!(matches!(error, ServiceError::NotFound { entity: "enrollment", .. }));
    }
}
