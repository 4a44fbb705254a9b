//! Student and teacher catalogues.
//!
//! Both rosters share the same shape and rules; [`Roster`] picks the table.
//! Emails are unique within a roster only, so the same address may belong to
//! a student and a teacher at once.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::validation::PersonFields;
use super::{ServiceError, ServiceResult};
use crate::error::RepositoryError;
use crate::models::{student, teacher};
use crate::repositories::{StudentRepository, TeacherRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Roster {
    Students,
    Teachers,
}

impl Roster {
    pub fn entity(self) -> &'static str {
        match self {
            Roster::Students => "student",
            Roster::Teachers => "teacher",
        }
    }
}

/// Raw create/update input as received from a client.
#[derive(Debug, Clone, Default)]
pub struct PersonInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl PersonInput {
    fn parse(&self) -> ServiceResult<PersonFields> {
        Ok(PersonFields::parse(
            &self.first_name,
            &self.last_name,
            &self.email,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<student::Model> for Person {
    fn from(model: student::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<teacher::Model> for Person {
    fn from(model: teacher::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

fn email_conflict(roster: Roster) -> ServiceError {
    ServiceError::Conflict {
        code: "EMAIL_ALREADY_EXISTS",
        message: format!("A {} with this email already exists", roster.entity()),
    }
}

/// A unique index firing on write means a concurrent request took the email.
fn on_write(roster: Roster, error: RepositoryError) -> ServiceError {
    match error {
        RepositoryError::UniqueViolation(_) => email_conflict(roster),
        other => other.into(),
    }
}

async fn email_taken(
    db: &DatabaseConnection,
    roster: Roster,
    email: &str,
    excluding: Option<Uuid>,
) -> ServiceResult<bool> {
    let taken = match roster {
        Roster::Students => {
            StudentRepository::new(db)
                .email_taken(email, excluding)
                .await?
        }
        Roster::Teachers => {
            TeacherRepository::new(db)
                .email_taken(email, excluding)
                .await?
        }
    };
    Ok(taken)
}

pub async fn create(
    db: &DatabaseConnection,
    roster: Roster,
    input: &PersonInput,
) -> ServiceResult<Person> {
    let fields = input.parse()?;

    if email_taken(db, roster, &fields.email, None).await? {
        return Err(email_conflict(roster));
    }

    let person: Person = match roster {
        Roster::Students => StudentRepository::new(db)
            .create(fields)
            .await
            .map_err(|error| on_write(roster, error))?
            .into(),
        Roster::Teachers => TeacherRepository::new(db)
            .create(fields)
            .await
            .map_err(|error| on_write(roster, error))?
            .into(),
    };

    tracing::info!(entity = roster.entity(), id = %person.id, "Person created");
    Ok(person)
}

pub async fn get(db: &DatabaseConnection, roster: Roster, id: Uuid) -> ServiceResult<Person> {
    let found: Option<Person> = match roster {
        Roster::Students => StudentRepository::new(db)
            .find_by_id(id)
            .await?
            .map(Into::into),
        Roster::Teachers => TeacherRepository::new(db)
            .find_by_id(id)
            .await?
            .map(Into::into),
    };

    found.ok_or_else(|| ServiceError::not_found(roster.entity(), id))
}

/// Everyone on the roster, ordered by last name then first name.
pub async fn list(db: &DatabaseConnection, roster: Roster) -> ServiceResult<Vec<Person>> {
    let people = match roster {
        Roster::Students => StudentRepository::new(db)
            .list()
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        Roster::Teachers => TeacherRepository::new(db)
            .list()
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
    };
    Ok(people)
}

/// Replace all fields of an existing person. The email may stay the same;
/// it only conflicts when another row on the roster already holds it.
pub async fn update(
    db: &DatabaseConnection,
    roster: Roster,
    id: Uuid,
    input: &PersonInput,
) -> ServiceResult<Person> {
    let fields = input.parse()?;

    let person: Person = match roster {
        Roster::Students => {
            let repo = StudentRepository::new(db);
            let existing = repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(roster.entity(), id))?;
            if email_taken(db, roster, &fields.email, Some(id)).await? {
                return Err(email_conflict(roster));
            }
            repo.update(existing, fields)
                .await
                .map_err(|error| on_write(roster, error))?
                .into()
        }
        Roster::Teachers => {
            let repo = TeacherRepository::new(db);
            let existing = repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(roster.entity(), id))?;
            if email_taken(db, roster, &fields.email, Some(id)).await? {
                return Err(email_conflict(roster));
            }
            repo.update(existing, fields)
                .await
                .map_err(|error| on_write(roster, error))?
                .into()
        }
    };

    Ok(person)
}

/// Hard delete. Students with enrollments or payments cannot be removed.
pub async fn delete(db: &DatabaseConnection, roster: Roster, id: Uuid) -> ServiceResult<()> {
    let removed = match roster {
        Roster::Students => StudentRepository::new(db).delete(id).await,
        Roster::Teachers => TeacherRepository::new(db).delete(id).await,
    }
    .map_err(ServiceError::on_delete)?;

    if !removed {
        return Err(ServiceError::not_found(roster.entity(), id));
    }

    tracing::info!(entity = roster.entity(), %id, "Person deleted");
    Ok(())
}
