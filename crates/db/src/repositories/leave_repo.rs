//! Repository for `leave_applications`.

use becs_core::leave::LeaveStatus;
use becs_core::types::DbId;
use sqlx::PgPool;

use crate::models::leave::{CreateLeaveApplication, LeaveApplication, LeaveFilter};

const COLUMNS: &str = "id, user_id, leave_type, start_date, end_date, reason, attachment_url, \
                       status, reviewed_by, reviewed_at, comments, created_at, updated_at";

pub struct LeaveRepo;

impl LeaveRepo {
    /// File a new application in `pending`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateLeaveApplication,
    ) -> Result<LeaveApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO leave_applications (user_id, leave_type, start_date, end_date, reason, attachment_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(input.user_id)
            .bind(input.leave_type.as_str())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.reason)
            .bind(&input.attachment_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<LeaveApplication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leave_applications WHERE id = $1");
        sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Applications matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &LeaveFilter,
    ) -> Result<Vec<LeaveApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_applications
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(filter.user_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Record a reviewer's decision on a pending application.
    ///
    /// Returns `None` if the application is no longer pending.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        status: LeaveStatus,
        reviewed_by: DbId,
        comments: Option<&str>,
    ) -> Result<Option<LeaveApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE leave_applications SET
                status = $2, reviewed_by = $3, reviewed_at = NOW(), comments = $4
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(reviewed_by)
            .bind(comments)
            .fetch_optional(pool)
            .await
    }

    /// Cancel a pending application. Returns `None` if it is no longer pending.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<LeaveApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE leave_applications SET status = 'cancelled'
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
