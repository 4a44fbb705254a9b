//! # Course Repository

use crate::error::RepositoryError;
use crate::models::course::{self, ActiveModel as CourseActiveModel, Entity as Course, Model as CourseModel};
use crate::services::validation::CourseFields;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, QuerySelect,
    Set,
};
use uuid::Uuid;

/// Repository for Course database operations
pub struct CourseRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CourseRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, fields: CourseFields) -> Result<CourseModel, RepositoryError> {
        let course = CourseActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(fields.name),
            description: Set(fields.description),
            monthly_price: Set(fields.monthly_price),
            created_at: Set(Utc::now().into()),
        };

        course
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CourseModel>, RepositoryError> {
        Course::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All courses ordered by name.
    pub async fn list(&self) -> Result<Vec<CourseModel>, RepositoryError> {
        Course::find()
            .order_by_asc(course::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update(
        &self,
        existing: CourseModel,
        fields: CourseFields,
    ) -> Result<CourseModel, RepositoryError> {
        let mut active = existing.into_active_model();
        active.name = Set(fields.name);
        active.description = Set(fields.description);
        active.monthly_price = Set(fields.monthly_price);

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = Course::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }

    /// Existence probe that reads only the key column.
    pub async fn exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let found = Course::find_by_id(id)
            .select_only()
            .column(course::Column::Id)
            .into_tuple::<Uuid>()
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(found.is_some())
    }
}
