//! Handlers for the `/leave-applications` resource.
//!
//! Staff apply for and cancel their own leave; admins and directors decide.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::leave::{
    ensure_pending, leave_days, validate_reason, LeaveDecision, LeaveStatus, LeaveType,
};
use becs_core::project::validate_date_range;
use becs_core::types::{Date, DbId};
use becs_db::models::leave::{CreateLeaveApplication, LeaveApplication, LeaveFilter};
use becs_db::repositories::LeaveRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePrivileged;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

/// An application plus its inclusive day count.
#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    #[serde(flatten)]
    pub application: LeaveApplication,
    pub total_days: i64,
}

impl From<LeaveApplication> for LeaveResponse {
    fn from(application: LeaveApplication) -> Self {
        let total_days = leave_days(application.start_date, application.end_date);
        Self {
            application,
            total_days,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaveListParams {
    pub user_id: Option<DbId>,
    pub status: Option<LeaveStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyLeaveRequest {
    pub leave_type: LeaveType,
    pub start_date: Date,
    pub end_date: Date,
    #[validate(length(max = 2000))]
    pub reason: String,
    #[validate(length(max = 500))]
    pub attachment_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LeaveDecisionRequest {
    pub decision: LeaveDecision,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

/// GET /api/leave-applications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<LeaveListParams>,
) -> AppResult<Json<DataResponse<Vec<LeaveResponse>>>> {
    let filter = scoped_filter(&auth, &params)?;
    let applications = LeaveRepo::list(&state.pool, &filter).await?;
    Ok(ok(applications.into_iter().map(LeaveResponse::from).collect()))
}

/// POST /api/leave-applications
pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<ApplyLeaveRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LeaveResponse>>)> {
    validate_date_range(Some(input.start_date), Some(input.end_date), "Leave")?;
    validate_reason(&input.reason)?;

    let create = CreateLeaveApplication {
        user_id: auth.user_id,
        leave_type: input.leave_type,
        start_date: input.start_date,
        end_date: input.end_date,
        reason: input.reason.trim().to_string(),
        attachment_url: input
            .attachment_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
    };
    let response = LeaveResponse::from(LeaveRepo::create(&state.pool, &create).await?);
    tracing::info!(
        application_id = response.application.id,
        user_id = auth.user_id,
        leave_type = %response.application.leave_type,
        days = response.total_days,
        "Leave application submitted"
    );
    Ok(created(response))
}

/// GET /api/leave-applications/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LeaveResponse>>> {
    let application = load(&state, id).await?;
    if !auth.is_privileged() && application.user_id != auth.user_id {
        return Err(AppError::forbidden(
            "Not permitted to view another user's leave application",
        ));
    }
    Ok(ok(application.into()))
}

/// POST /api/leave-applications/{id}/decision
pub async fn decide(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<LeaveDecisionRequest>,
) -> AppResult<Json<DataResponse<LeaveResponse>>> {
    let application = load(&state, id).await?;
    ensure_pending(application.status)?;

    let status = input.decision.resulting_status();
    let comments = input
        .comments
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let decided = LeaveRepo::decide(&state.pool, id, status, auth.user_id, comments)
        .await?
        .ok_or_else(|| no_longer_pending(id))?;
    tracing::info!(
        application_id = id,
        reviewed_by = auth.user_id,
        status = %decided.status,
        "Leave application decided"
    );
    Ok(ok(decided.into()))
}

/// POST /api/leave-applications/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LeaveResponse>>> {
    let application = load(&state, id).await?;
    if application.user_id != auth.user_id {
        return Err(AppError::forbidden(
            "Only the applicant can cancel a leave application",
        ));
    }
    ensure_pending(application.status)?;

    let cancelled = LeaveRepo::cancel(&state.pool, id)
        .await?
        .ok_or_else(|| no_longer_pending(id))?;
    tracing::info!(application_id = id, user_id = auth.user_id, "Leave application cancelled");
    Ok(ok(cancelled.into()))
}

async fn load(state: &AppState, id: DbId) -> AppResult<LeaveApplication> {
    LeaveRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Leave application", id))
}

fn no_longer_pending(id: DbId) -> AppError {
    AppError::conflict(format!("Leave application {id} is no longer pending"))
}

/// Staff only ever see their own applications.
fn scoped_filter(auth: &AuthUser, params: &LeaveListParams) -> AppResult<LeaveFilter> {
    let user_id = if auth.is_privileged() {
        params.user_id
    } else {
        match params.user_id {
            Some(id) if id != auth.user_id => {
                return Err(AppError::forbidden(
                    "Not permitted to view another user's leave applications",
                ));
            }
            _ => Some(auth.user_id),
        }
    };
    Ok(LeaveFilter {
        user_id,
        status: params.status,
    })
}
