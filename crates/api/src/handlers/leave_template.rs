//! Handlers for the `/leave-templates` resource: canned leave reasons that
//! pre-fill an application.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::leave::LeaveType;
use becs_core::types::DbId;
use becs_core::validation::not_blank;
use becs_db::models::leave_template::{CreateLeaveTemplate, LeaveTemplate};
use becs_db::repositories::LeaveTemplateRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePrivileged;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LeaveTemplateListParams {
    pub leave_type: Option<LeaveType>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeaveTemplateRequest {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,
    pub leave_type: LeaveType,
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub template_content: String,
}

/// GET /api/leave-templates
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<LeaveTemplateListParams>,
) -> AppResult<Json<DataResponse<Vec<LeaveTemplate>>>> {
    let templates = LeaveTemplateRepo::list(&state.pool, params.leave_type).await?;
    Ok(ok(templates))
}

/// POST /api/leave-templates
///
/// A duplicate name is a 409.
pub async fn create(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    ValidJson(input): ValidJson<CreateLeaveTemplateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LeaveTemplate>>)> {
    let create = CreateLeaveTemplate {
        name: input.name.trim().to_string(),
        leave_type: input.leave_type,
        template_content: input.template_content.trim().to_string(),
        created_by: auth.user_id,
    };
    let template = LeaveTemplateRepo::create(&state.pool, &create).await?;
    tracing::info!(
        leave_template_id = template.id,
        leave_type = %template.leave_type,
        created_by = auth.user_id,
        "Leave template created"
    );
    Ok(created(template))
}

/// DELETE /api/leave-templates/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if LeaveTemplateRepo::delete(&state.pool, id).await? {
        tracing::info!(leave_template_id = id, deleted_by = auth.user_id, "Leave template deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Leave template", id))
    }
}
