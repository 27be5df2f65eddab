//! Handlers for the `/attendance` resource.
//!
//! Staff clock themselves in and out; each user has at most one open record.
//! Privileged users can read everyone's records, others only their own.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::attendance::{worked_hours, AttendanceSummary};
use becs_core::error::CoreError;
use becs_core::types::DbId;
use becs_db::models::attendance::{AttendanceFilter, AttendanceRecord};
use becs_db::repositories::AttendanceRepo;
use chrono::Utc;

use super::today;
use crate::error::{AppError, AppResult};
use crate::extract::QueryParams;
use crate::middleware::auth::AuthUser;
use crate::query::DateRangeParams;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

/// GET /api/attendance
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<DateRangeParams>,
) -> AppResult<Json<DataResponse<Vec<AttendanceRecord>>>> {
    let filter = scoped_filter(&auth, &params)?;
    let records = AttendanceRepo::list(&state.pool, &filter).await?;
    Ok(ok(records))
}

/// GET /api/attendance/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<DateRangeParams>,
) -> AppResult<Json<DataResponse<AttendanceSummary>>> {
    let filter = scoped_filter(&auth, &params)?;
    let hours = AttendanceRepo::hours(&state.pool, &filter).await?;
    Ok(ok(AttendanceSummary::from_hours(hours)))
}

/// GET /api/attendance/today/{user_id}
pub async fn today_for_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttendanceRecord>>>> {
    let today = today();
    let params = DateRangeParams {
        user_id: Some(user_id),
        from: Some(today),
        to: Some(today),
    };
    let filter = scoped_filter(&auth, &params)?;
    let records = AttendanceRepo::list(&state.pool, &filter).await?;
    Ok(ok(records))
}

/// POST /api/attendance/clock-in
pub async fn clock_in(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<(StatusCode, Json<DataResponse<AttendanceRecord>>)> {
    if let Some(open) = AttendanceRepo::find_open(&state.pool, auth.user_id).await? {
        return Err(AppError::conflict(format!(
            "Already clocked in since {} (record {}); clock out first",
            open.time_in.map(|t| t.to_rfc3339()).unwrap_or_default(),
            open.id
        )));
    }
    let record = AttendanceRepo::clock_in(&state.pool, auth.user_id, today()).await?;
    tracing::info!(user_id = auth.user_id, record_id = record.id, "Clocked in");
    Ok(created(record))
}

/// POST /api/attendance/clock-out
pub async fn clock_out(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<AttendanceRecord>>> {
    let open = AttendanceRepo::find_open(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Open attendance record for user",
            id: auth.user_id,
        }))?;

    let now = Utc::now();
    let total_hours = match open.time_in {
        Some(time_in) => worked_hours(time_in, now)?,
        None => 0.0,
    };
    let record = AttendanceRepo::clock_out(&state.pool, open.id, now, total_hours)
        .await?
        .ok_or_else(|| AppError::conflict("Attendance record was already closed"))?;
    tracing::info!(
        user_id = auth.user_id,
        record_id = record.id,
        total_hours,
        "Clocked out"
    );
    Ok(ok(record))
}

/// Ordinary staff are pinned to their own records.
fn scoped_filter(auth: &AuthUser, params: &DateRangeParams) -> AppResult<AttendanceFilter> {
    params.validate()?;
    let user_id = if auth.is_privileged() {
        params.user_id
    } else {
        match params.user_id {
            Some(id) if id != auth.user_id => {
                return Err(AppError::forbidden(
                    "Not permitted to view another user's attendance",
                ));
            }
            _ => Some(auth.user_id),
        }
    };
    Ok(AttendanceFilter {
        user_id,
        from: params.from,
        to: params.to,
    })
}
