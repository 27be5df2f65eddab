//! `GET /dashboard/stats`: organization-wide rollups.

use axum::extract::State;
use axum::Json;
use becs_db::models::dashboard::DashboardStats;
use becs_db::repositories::DashboardRepo;

use super::today;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::{ok, DataResponse};
use crate::state::AppState;

pub async fn stats(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let stats = DashboardRepo::stats(&state.pool, today()).await?;
    Ok(ok(stats))
}
