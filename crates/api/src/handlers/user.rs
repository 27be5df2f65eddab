//! Handlers for the `/users` resource (staff directory and account admin).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::roles::Role;
use becs_core::types::DbId;
use becs_core::user::{normalize_email, validate_staff_id, MIN_PASSWORD_LENGTH};
use becs_core::validation::not_blank;
use becs_db::models::user::{CreateUser, UpdateUser, UserFilter, UserResponse};
use becs_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequirePrivileged};
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

/// `MIN_PASSWORD_LENGTH` as the `u64` the `validator` length rule expects.
const MIN_PASSWORD_LENGTH_U64: u64 = MIN_PASSWORD_LENGTH as u64;

#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub role: Option<Role>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(length(max = 50), custom(function = "not_blank"))]
    pub staff_id: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = MIN_PASSWORD_LENGTH_U64))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone_number: Option<String>,
}

fn default_role() -> Role {
    Role::Staff
}

/// Profile fields any user may change on their own account; the rest need a
/// privileged caller.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone_number: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    fn touches_account_fields(&self) -> bool {
        self.email.is_some() || self.role.is_some() || self.is_active.is_some()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = MIN_PASSWORD_LENGTH_U64))]
    pub new_password: String,
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let filter = UserFilter {
        role: params.role,
        include_inactive: params.include_inactive,
    };
    let users = UserRepo::list(&state.pool, &filter).await?;
    Ok(ok(users.iter().map(UserResponse::from).collect()))
}

/// POST /api/users
///
/// Only admins may create other admins.
pub async fn create(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    ValidJson(input): ValidJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    if input.role == Role::Admin && auth.role != Role::Admin {
        return Err(AppError::forbidden("Only admins may create admin accounts"));
    }
    validate_staff_id(&input.staff_id)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let create = CreateUser {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        staff_id: input.staff_id.trim().to_string(),
        email: normalize_email(&input.email),
        password_hash,
        role: input.role,
        department: input.department,
        position: input.position,
        phone_number: input.phone_number,
    };
    let user = UserRepo::create(&state.pool, &create).await?;
    tracing::info!(user_id = user.id, created_by = auth.user_id, role = %user.role, "User created");

    Ok(created(UserResponse::from(&user)))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("User", id))?;
    Ok(ok(UserResponse::from(&user)))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let is_self = auth.user_id == id;
    if !auth.is_privileged() && !(is_self && !input.touches_account_fields()) {
        return Err(AppError::forbidden(
            "Only admins and directors may edit other accounts or account settings",
        ));
    }
    if input.role == Some(Role::Admin) && auth.role != Role::Admin {
        return Err(AppError::forbidden("Only admins may grant the admin role"));
    }

    let update = UpdateUser {
        first_name: input.first_name.map(|s| s.trim().to_string()),
        last_name: input.last_name.map(|s| s.trim().to_string()),
        email: input.email.as_deref().map(normalize_email),
        role: input.role,
        department: input.department,
        position: input.position,
        phone_number: input.phone_number,
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::not_found("User", id))?;

    if update.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }
    tracing::info!(user_id = id, updated_by = auth.user_id, "User updated");
    Ok(ok(UserResponse::from(&user)))
}

/// DELETE /api/users/{id}
///
/// Deactivates the account and revokes its sessions. Records are kept.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if auth.user_id == id {
        return Err(AppError::conflict("You cannot deactivate your own account"));
    }
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("User", id))?;

    UserRepo::deactivate(&state.pool, id).await?;
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, deactivated_by = auth.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &password_hash).await? {
        return Err(AppError::not_found("User", id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, reset_by = auth.user_id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}
