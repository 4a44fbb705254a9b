//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for the back office entities. Each repository borrows the shared connection pool
//! and returns [`RepositoryError`](crate::error::RepositoryError).

pub mod admin_user;
pub mod course;
pub mod enrollment;
pub mod payment;
pub mod student;
pub mod teacher;

pub use admin_user::AdminUserRepository;
pub use course::CourseRepository;
pub use enrollment::{EnrollmentFilter, EnrollmentRepository};
pub use payment::{NewPayment, PaymentPoint, PaymentRepository};
pub use student::StudentRepository;
pub use teacher::TeacherRepository;
