//! Read-only dashboard rollups.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::FromRow;

/// Everything `GET /dashboard/stats` returns.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub projects: ProjectStats,
    pub tasks: TaskStats,
    pub staff: StaffStats,
    pub invoices: InvoiceStats,
    pub pending_leave_applications: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    pub total: i64,
    pub active: i64,
    pub ahp: i64,
    pub private: i64,
    /// AHP project counts keyed `consortium_1`..`consortium_5` plus `unassigned`.
    pub by_consortium: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub total: i64,
    /// Stored status -> count. Every status is present, zero if unused.
    pub by_status: BTreeMap<String, i64>,
    pub overdue: i64,
    pub awaiting_review: i64,
    pub open_weekly_deliverables: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StaffStats {
    pub total_active: i64,
    /// Users with an open attendance record today.
    pub present_today: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceStats {
    pub unpaid_count: i64,
    pub unpaid_amount_cents: i64,
    pub overdue_count: i64,
    pub overdue_amount_cents: i64,
}
