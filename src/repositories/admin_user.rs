//! # Admin User Repository

use crate::error::RepositoryError;
use crate::models::admin_user::{
    self, ActiveModel as AdminUserActiveModel, Entity as AdminUser, Model as AdminUserModel,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

pub struct AdminUserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdminUserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminUserModel>, RepositoryError> {
        AdminUser::find()
            .filter(admin_user::Column::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Insert an admin whose password has already been hashed.
    pub async fn create(
        &self,
        username: &str,
        password_hash: String,
    ) -> Result<AdminUserModel, RepositoryError> {
        let admin = AdminUserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now().into()),
        };

        admin
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
