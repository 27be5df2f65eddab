//! First-run admin account.
//!
//! Accounts are only ever created by privileged users, so an empty database
//! needs one account seeded from configuration.

use becs_core::roles::Role;
use becs_core::user::{normalize_email, validate_password};
use becs_db::models::user::{CreateUser, User};
use becs_db::repositories::UserRepo;
use becs_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Staff id given to the seeded account.
pub const BOOTSTRAP_STAFF_ID: &str = "ADMIN001";

/// Create the configured admin if no users exist yet.
///
/// Returns the new user, or `None` when accounts already exist.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<Option<User>> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }
    validate_password(&admin.password)?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    let input = CreateUser {
        first_name: "System".to_string(),
        last_name: "Administrator".to_string(),
        staff_id: BOOTSTRAP_STAFF_ID.to_string(),
        email: normalize_email(&admin.email),
        password_hash,
        role: Role::Admin,
        department: None,
        position: None,
        phone_number: None,
    };
    let user = UserRepo::create(pool, &input).await?;
    tracing::info!(user_id = user.id, email = %user.email, "Created bootstrap admin account");
    Ok(Some(user))
}
