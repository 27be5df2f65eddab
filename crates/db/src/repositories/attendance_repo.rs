//! Repository for `attendance_records`.
//!
//! A partial unique index (`uq_attendance_open_per_user`) guarantees at most
//! one open record per user.

use becs_core::types::{Date, DbId, Timestamp};
use sqlx::PgPool;

use crate::models::attendance::{AttendanceFilter, AttendanceRecord};

const COLUMNS: &str =
    "id, user_id, work_date, time_in, time_out, total_hours, created_at, updated_at";

/// Clock-in / clock-out ledger.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Open a record for `user_id` on `work_date`, clocked in now.
    ///
    /// Fails with a `uq_attendance_open_per_user` violation if one is already open.
    pub async fn clock_in(
        pool: &PgPool,
        user_id: DbId,
        work_date: Date,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records (user_id, work_date, time_in)
             VALUES ($1, $2, NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(user_id)
            .bind(work_date)
            .fetch_one(pool)
            .await
    }

    /// The user's open record, if any.
    pub async fn find_open(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE user_id = $1 AND time_out IS NULL"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Close an open record with the given worked hours.
    ///
    /// Returns `None` if the record was closed concurrently.
    pub async fn clock_out(
        pool: &PgPool,
        id: DbId,
        time_out: Timestamp,
        total_hours: f64,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_records SET time_out = $2, total_hours = $3
             WHERE id = $1 AND time_out IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .bind(time_out)
            .bind(total_hours)
            .fetch_optional(pool)
            .await
    }

    /// Records matching the filter, newest day first.
    pub async fn list(
        pool: &PgPool,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::DATE IS NULL OR work_date >= $2)
               AND ($3::DATE IS NULL OR work_date <= $3)
             ORDER BY work_date DESC, time_in DESC NULLS LAST, id DESC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(filter.user_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(pool)
            .await
    }

    /// `total_hours` of each matching record (`None` while still open).
    pub async fn hours(
        pool: &PgPool,
        filter: &AttendanceFilter,
    ) -> Result<Vec<Option<f64>>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT total_hours FROM attendance_records
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::DATE IS NULL OR work_date >= $2)
               AND ($3::DATE IS NULL OR work_date <= $3)",
        )
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(pool)
        .await
    }
}
