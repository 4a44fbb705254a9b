//! Course catalogue.

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::validation::CourseFields;
use super::{ServiceError, ServiceResult};
use crate::models::course;
use crate::repositories::CourseRepository;

const ENTITY: &str = "course";

#[derive(Debug, Clone, Default)]
pub struct CourseInput {
    pub name: String,
    pub description: Option<String>,
    pub monthly_price: Decimal,
}

impl CourseInput {
    fn parse(&self) -> ServiceResult<CourseFields> {
        Ok(CourseFields::parse(
            &self.name,
            self.description.as_deref(),
            self.monthly_price,
        )?)
    }
}

pub async fn create(db: &DatabaseConnection, input: &CourseInput) -> ServiceResult<course::Model> {
    let fields = input.parse()?;
    let created = CourseRepository::new(db).create(fields).await?;

    tracing::info!(id = %created.id, monthly_price = %created.monthly_price, "Course created");
    Ok(created)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<course::Model> {
    CourseRepository::new(db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(ENTITY, id))
}

pub async fn list(db: &DatabaseConnection) -> ServiceResult<Vec<course::Model>> {
    Ok(CourseRepository::new(db).list().await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: &CourseInput,
) -> ServiceResult<course::Model> {
    let fields = input.parse()?;
    let repo = CourseRepository::new(db);
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(ENTITY, id))?;

    Ok(repo.update(existing, fields).await?)
}

/// Hard delete. Courses with enrollments cannot be removed.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
    let removed = CourseRepository::new(db)
        .delete(id)
        .await
        .map_err(ServiceError::on_delete)?;

    if !removed {
        return Err(ServiceError::not_found(ENTITY, id));
    }
    Ok(())
}
