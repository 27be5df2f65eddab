//! Leave application model and DTOs.

use becs_core::leave::{LeaveStatus, LeaveType};
use becs_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaveApplication {
    pub id: DbId,
    pub user_id: DbId,
    #[sqlx(try_from = "String")]
    pub leave_type: LeaveType,
    pub start_date: Date,
    pub end_date: Date,
    pub reason: String,
    pub attachment_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: LeaveStatus,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub comments: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateLeaveApplication {
    pub user_id: DbId,
    pub leave_type: LeaveType,
    pub start_date: Date,
    pub end_date: Date,
    pub reason: String,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveFilter {
    pub user_id: Option<DbId>,
    pub status: Option<LeaveStatus>,
}
