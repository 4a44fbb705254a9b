//! Enrollment entity model
//!
//! This module contains the SeaORM entity model for the enrollments table,
//! linking a student to a course for a period of time.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::course::Entity as Course;
use super::student::Entity as Student;

/// Enrollment of a student in a course
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    /// Unique identifier for the enrollment (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Enrolled student
    pub student_id: Uuid,

    /// Course the student is enrolled in
    pub course_id: Uuid,

    /// When the enrollment started (server-assigned)
    pub start_date: DateTimeWithTimeZone,

    /// When the enrollment was ended; only set once it becomes inactive
    pub end_date: Option<DateTimeWithTimeZone>,

    /// At most one active row exists per (student_id, course_id)
    pub is_active: bool,

    /// Timestamp when the enrollment was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Student",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_delete = "Restrict"
    )]
    Student,
    #[sea_orm(
        belongs_to = "Course",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "Restrict"
    )]
    Course,
}

impl Related<Student> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<Course> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
