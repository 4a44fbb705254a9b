//! # Language School Back Office Library
//!
//! Students, teachers, courses, enrollments, payments and monthly payment
//! reports behind an admin-authenticated JSON API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod services;
pub mod telemetry;
pub use migration;
