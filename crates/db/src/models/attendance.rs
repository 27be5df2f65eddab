//! Attendance ledger rows.

use becs_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A clock-in/clock-out pair for one user on one day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(rename = "date")]
    pub work_date: Date,
    pub time_in: Option<Timestamp>,
    pub time_out: Option<Timestamp>,
    /// Set once both times are known.
    pub total_hours: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceFilter {
    pub user_id: Option<DbId>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}
