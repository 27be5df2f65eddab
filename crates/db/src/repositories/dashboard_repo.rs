//! Read-only rollups for `GET /dashboard/stats`.

use std::collections::BTreeMap;

use becs_core::project::{Consortium, UNASSIGNED_BUCKET};
use becs_core::task_workflow::TaskStatus;
use becs_core::types::Date;
use sqlx::PgPool;

use crate::models::dashboard::{
    DashboardStats, InvoiceStats, ProjectStats, StaffStats, TaskStats,
};

/// Aggregate queries over projects, tasks, staff, leave and invoices.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Compute every dashboard rollup. `today` drives the overdue overlay and
    /// the staff-present count.
    pub async fn stats(pool: &PgPool, today: Date) -> Result<DashboardStats, sqlx::Error> {
        Ok(DashboardStats {
            projects: Self::project_stats(pool).await?,
            tasks: Self::task_stats(pool, today).await?,
            staff: Self::staff_stats(pool, today).await?,
            invoices: Self::invoice_stats(pool).await?,
            pending_leave_applications: sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM leave_applications WHERE status = 'pending'",
            )
            .fetch_one(pool)
            .await?,
        })
    }

    async fn project_stats(pool: &PgPool) -> Result<ProjectStats, sqlx::Error> {
        let (total, active, ahp, private): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'active'),
                COUNT(*) FILTER (WHERE project_type = 'AHP'),
                COUNT(*) FILTER (WHERE project_type = 'Private')
             FROM projects WHERE deleted_at IS NULL",
        )
        .fetch_one(pool)
        .await?;

        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT consortium, COUNT(*) FROM projects
             WHERE deleted_at IS NULL AND project_type = 'AHP'
             GROUP BY consortium",
        )
        .fetch_all(pool)
        .await?;

        let mut by_consortium: BTreeMap<String, i64> = Consortium::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .chain(std::iter::once((UNASSIGNED_BUCKET.to_string(), 0)))
            .collect();
        for (consortium, count) in rows {
            let key = consortium.unwrap_or_else(|| UNASSIGNED_BUCKET.to_string());
            *by_consortium.entry(key).or_insert(0) += count;
        }

        Ok(ProjectStats {
            total,
            active,
            ahp,
            private,
            by_consortium,
        })
    }

    async fn task_stats(pool: &PgPool, today: Date) -> Result<TaskStats, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT t.status, COUNT(*) FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.deleted_at IS NULL
             GROUP BY t.status",
        )
        .fetch_all(pool)
        .await?;

        let mut by_status: BTreeMap<String, i64> = TaskStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for (status, count) in rows {
            *by_status.entry(status).or_insert(0) += count;
        }
        let total = by_status.values().sum();
        let awaiting_review = [TaskStatus::Submitted, TaskStatus::UnderReview]
            .iter()
            .filter_map(|s| by_status.get(s.as_str()))
            .sum();

        let (overdue, open_weekly_deliverables): (i64, i64) = sqlx::query_as(
            "SELECT
                COUNT(*) FILTER (
                    WHERE t.status <> 'completed' AND t.target_completion_date < $1
                ),
                COUNT(*) FILTER (
                    WHERE t.status <> 'completed' AND t.is_weekly_deliverable
                )
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.deleted_at IS NULL",
        )
        .bind(today)
        .fetch_one(pool)
        .await?;

        Ok(TaskStats {
            total,
            by_status,
            overdue,
            awaiting_review,
            open_weekly_deliverables,
        })
    }

    async fn staff_stats(pool: &PgPool, today: Date) -> Result<StaffStats, sqlx::Error> {
        sqlx::query_as::<_, StaffStats>(
            "SELECT
                (SELECT COUNT(*) FROM users WHERE is_active) AS total_active,
                (SELECT COUNT(DISTINCT user_id) FROM attendance_records
                  WHERE work_date = $1 AND time_in IS NOT NULL AND time_out IS NULL
                ) AS present_today",
        )
        .bind(today)
        .fetch_one(pool)
        .await
    }

    async fn invoice_stats(pool: &PgPool) -> Result<InvoiceStats, sqlx::Error> {
        sqlx::query_as::<_, InvoiceStats>(
            "SELECT
                COUNT(*) FILTER (WHERE status = 'unpaid') AS unpaid_count,
                COALESCE(SUM(amount_cents) FILTER (WHERE status = 'unpaid'), 0)::BIGINT
                    AS unpaid_amount_cents,
                COUNT(*) FILTER (WHERE status = 'overdue') AS overdue_count,
                COALESCE(SUM(amount_cents) FILTER (WHERE status = 'overdue'), 0)::BIGINT
                    AS overdue_amount_cents
             FROM invoices",
        )
        .fetch_one(pool)
        .await
    }
}
