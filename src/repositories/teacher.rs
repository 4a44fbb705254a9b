//! # Teacher Repository
//!
//! CRUD access to the `teachers` table.

use crate::error::RepositoryError;
use crate::models::teacher::{self, ActiveModel as TeacherActiveModel, Entity as Teacher, Model as TeacherModel};
use crate::services::validation::PersonFields;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Repository for Teacher database operations
pub struct TeacherRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TeacherRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, fields: PersonFields) -> Result<TeacherModel, RepositoryError> {
        let teacher = TeacherActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(fields.first_name),
            last_name: Set(fields.last_name),
            email: Set(fields.email),
            created_at: Set(Utc::now().into()),
        };

        teacher
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TeacherModel>, RepositoryError> {
        Teacher::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All teachers ordered by last name, then first name.
    pub async fn list(&self) -> Result<Vec<TeacherModel>, RepositoryError> {
        Teacher::find()
            .order_by_asc(teacher::Column::LastName)
            .order_by_asc(teacher::Column::FirstName)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Replace every editable field of an existing row.
    pub async fn update(
        &self,
        existing: TeacherModel,
        fields: PersonFields,
    ) -> Result<TeacherModel, RepositoryError> {
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
        let result = Teacher::delete_by_id(id)
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
        let mut query = Teacher::find()
            .select_only()
            .column(teacher::Column::Id)
            .filter(teacher::Column::Email.eq(email));

        if let Some(id) = excluding {
            query = query.filter(teacher::Column::Id.ne(id));
        }

        let found = query
            .into_tuple::<Uuid>()
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(found.is_some())
    }
}
