//! # Enrollment Repository
//!
//! Enrollments are soft-closed by [`EnrollmentRepository::mark_ended`] and
//! hard-deleted by [`EnrollmentRepository::delete`]; nothing ever flips a row
//! back to active.

use crate::error::RepositoryError;
use crate::models::enrollment::{
    self, ActiveModel as EnrollmentActiveModel, Entity as Enrollment, Model as EnrollmentModel,
};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Optional criteria for listing enrollments.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentFilter {
    pub student_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub active_only: bool,
}

/// Repository for Enrollment database operations
pub struct EnrollmentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EnrollmentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new active enrollment starting now.
    pub async fn create_active(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<EnrollmentModel, RepositoryError> {
        let enrollment = EnrollmentActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            course_id: Set(course_id),
            start_date: Set(Utc::now().into()),
            end_date: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        enrollment
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EnrollmentModel>, RepositoryError> {
        Enrollment::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn has_active(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let found = Enrollment::find()
            .select_only()
            .column(enrollment::Column::Id)
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .filter(enrollment::Column::IsActive.eq(true))
            .into_tuple::<Uuid>()
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(found.is_some())
    }

    /// Enrollments matching `filter`, newest start date first.
    pub async fn list(
        &self,
        filter: &EnrollmentFilter,
    ) -> Result<Vec<EnrollmentModel>, RepositoryError> {
        let mut query = Enrollment::find();

        if let Some(student_id) = filter.student_id {
            query = query.filter(enrollment::Column::StudentId.eq(student_id));
        }
        if let Some(course_id) = filter.course_id {
            query = query.filter(enrollment::Column::CourseId.eq(course_id));
        }
        if filter.active_only {
            query = query.filter(enrollment::Column::IsActive.eq(true));
        }

        query
            .order_by_desc(enrollment::Column::StartDate)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn mark_ended(
        &self,
        existing: EnrollmentModel,
        end_date: DateTimeWithTimeZone,
    ) -> Result<EnrollmentModel, RepositoryError> {
        let mut active = existing.into_active_model();
        active.is_active = Set(false);
        active.end_date = Set(Some(end_date));

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = Enrollment::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }
}
