//! Initial admin account creation.
//!
//! Organizer accounts are provisioned by admins, so a fresh deployment needs
//! one admin to exist before anything else can happen. When configured, the
//! account is created at startup; the insert is idempotent across restarts.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;
use persistence::repositories::UserRepository;
use shared::password::{hash_password, PasswordError};

/// Error type for admin bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// Create the initial admin account if configured and absent.
///
/// Called after migrations on startup. Skipped entirely when email or
/// password is empty; a no-op when the email already exists.
pub async fn ensure_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<(), BootstrapError> {
    if config.email.is_empty() {
        return Ok(());
    }

    if config.password.is_empty() {
        warn!("EH__ADMIN__EMAIL is set but EH__ADMIN__PASSWORD is empty, skipping admin bootstrap");
        return Ok(());
    }

    let password_hash = hash_password(&config.password)?;

    let repo = UserRepository::new(pool.clone());
    match repo.create_admin_if_absent(&config.email, &password_hash).await? {
        Some(user) => {
            info!(
                email = %config.email,
                user_id = %user.id,
                "Bootstrap admin account created"
            );
        }
        None => {
            info!(email = %config.email, "Admin account already exists, skipping bootstrap");
        }
    }

    Ok(())
}
