//! Database seeding functionality
//!
//! Rows the application needs before it can serve its first request.

pub mod admin;

pub use admin::{BootstrapOutcome, bootstrap_admin};
