//! # Data Models
//!
//! This module contains all the data models used throughout the back office API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod admin_user;
pub mod course;
pub mod enrollment;
pub mod payment;
pub mod student;
pub mod teacher;

pub use admin_user::Entity as AdminUser;
pub use course::Entity as Course;
pub use enrollment::Entity as Enrollment;
pub use payment::Entity as Payment;
pub use student::Entity as Student;
pub use teacher::Entity as Teacher;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "backoffice".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
