//! Bootstrap admin account
//!
//! Ensures the configured admin user exists so the first login can succeed
//! on an empty database.

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::repositories::AdminUserRepository;
use crate::services::session::hash_password;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyPresent,
}

/// Creates the configured admin user if no row with that username exists.
///
/// An existing row is never touched, so rotating `BACKOFFICE_ADMIN_PASSWORD`
/// after the first start has no effect on the stored hash.
pub async fn bootstrap_admin(db: &DatabaseConnection, config: &AppConfig) -> Result<BootstrapOutcome> {
    let username = config.admin_username.trim();
    let repo = AdminUserRepository::new(db);

    if repo.find_by_username(username).await?.is_some() {
        log::info!("Admin user '{}' already exists, skipping", username);
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let (password, fallback) = config.admin_password_or_fallback()?;
    if fallback {
        tracing::warn!(
            profile = %config.profile,
            "BACKOFFICE_ADMIN_PASSWORD not set; seeding admin with the development password"
        );
    }

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")??;

    repo.create(username, password_hash).await?;
    log::info!("Created admin user '{}'", username);

    Ok(BootstrapOutcome::Created)
}
