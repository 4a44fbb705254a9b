//! # Student Repository
//!
//! CRUD access to the `students` table.

use crate::error::RepositoryError;
use crate::models::student::{self, ActiveModel as StudentActiveModel, Entity as Student, Model as StudentModel};
use crate::services::validation::PersonFields;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Repository for Student database operations
pub struct StudentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StudentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, fields: PersonFields) -> Result<StudentModel, RepositoryError> {
        let student = StudentActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(fields.first_name),
            last_name: Set(fields.last_name),
            email: Set(fields.email),
            created_at: Set(Utc::now().into()),
        };

        student
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StudentModel>, RepositoryError> {
        Student::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All students ordered by last name, then first name.
    pub async fn list(&self) -> Result<Vec<StudentModel>, RepositoryError> {
        Student::find()
            .order_by_asc(student::Column::LastName)
            .order_by_asc(student::Column::FirstName)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Replace every editable field of an existing row.
    pub async fn update(
        &self,
        existing: StudentModel,
        fields: PersonFields,
    ) -> Result<StudentModel, RepositoryError> {
        let mut active = existing.into_active_model();
        active.first_name = Set(fields.first_name);
        active.last_name = Set(fields.last_name);
        active.email = Set(fields.email);

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete by id, returning whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = Student::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }

    /// Whether another row already uses `email` (already normalized).
    pub async fn email_taken(
        &self,
        email: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        let mut query = Student::find()
            .select_only()
            .column(student::Column::Id)
            .filter(student::Column::Email.eq(email));

        if let Some(id) = excluding {
            query = query.filter(student::Column::Id.ne(id));
        }

        let found = query
            .into_tuple::<Uuid>()
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(found.is_some())
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let found = Student::find_by_id(id)
            .select_only()
            .column(student::Column::Id)
            .into_tuple::<Uuid>()
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(found.is_some())
    }
}
