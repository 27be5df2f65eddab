//! Task entity model and DTOs.

use becs_core::task_workflow::{StatusFilter, TaskPriority, TaskStatus};
use becs_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub assignee_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    pub target_completion_date: Option<Date>,
    pub is_weekly_deliverable: bool,
    pub uploaded_file_name: Option<String>,
    /// Location under the storage root. Internal only.
    #[serde(skip_serializing)]
    pub stored_file_path: Option<String>,
    pub uploaded_file_size: Option<i64>,
    pub submission_notes: Option<String>,
    pub uploaded_at: Option<Timestamp>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new task. New tasks always start at `not_started`.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub assignee_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    pub target_completion_date: Option<Date>,
    pub is_weekly_deliverable: bool,
    pub created_by: DbId,
}

/// DTO for editing task details. Status is never changed here.
///
/// The nullable links use `Option<Option<_>>`: `None` keeps the stored value,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Option<DbId>>,
    pub reviewer_id: Option<Option<DbId>>,
    pub target_completion_date: Option<Option<Date>>,
    pub is_weekly_deliverable: Option<bool>,
}

/// File metadata recorded by a submission.
#[derive(Debug, Clone)]
pub struct TaskSubmission {
    pub uploaded_file_name: String,
    pub stored_file_path: String,
    pub uploaded_file_size: i64,
    pub submission_notes: Option<String>,
}

/// Optional filters for listing tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub project_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    pub status: Option<StatusFilter>,
    pub is_weekly_deliverable: Option<bool>,
    /// Restrict to tasks where this user is assignee or reviewer.
    pub visible_to: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}
