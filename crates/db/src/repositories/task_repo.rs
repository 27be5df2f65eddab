//! Repository for the `tasks` table.
//!
//! Status changes go through [`TaskRepo::update_status`] and
//! [`TaskRepo::record_submission`], both guarded by the status the caller
//! validated against, so a concurrent change surfaces as `None` instead of
//! being overwritten.

use becs_core::project::Consortium;
use becs_core::task_workflow::{StatusFilter, TaskStatus};
use becs_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, TaskFilter, TaskSubmission, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, description, priority, status, assignee_id, \
                       reviewer_id, target_completion_date, is_weekly_deliverable, \
                       uploaded_file_name, stored_file_path, uploaded_file_size, \
                       submission_notes, uploaded_at, created_by, created_at, updated_at";

/// Same columns qualified with the `t` alias for joined queries.
const T_COLUMNS: &str = "t.id, t.project_id, t.title, t.description, t.priority, t.status, \
                         t.assignee_id, t.reviewer_id, t.target_completion_date, \
                         t.is_weekly_deliverable, t.uploaded_file_name, t.stored_file_path, \
                         t.uploaded_file_size, t.submission_notes, t.uploaded_at, \
                         t.created_by, t.created_at, t.updated_at";

const INSERT: &str = "INSERT INTO tasks (project_id, title, description, priority, assignee_id,
                                         reviewer_id, target_completion_date,
                                         is_weekly_deliverable, created_by)
                      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

/// Task persistence and guarded status updates.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task in `not_started`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!("{INSERT} RETURNING {COLUMNS}");
        bind_create(sqlx::query_as::<_, Task>(&query), input)
            .fetch_one(pool)
            .await
    }

    /// Insert several tasks in one transaction. Either all are created or none.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[CreateTask],
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("{INSERT} RETURNING {COLUMNS}");
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let task = bind_create(sqlx::query_as::<_, Task>(&query), input)
                .fetch_one(&mut *tx)
                .await?;
            created.push(task);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Find a task by ID. Tasks of soft-deleted projects are not visible.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {T_COLUMNS} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = $1 AND p.deleted_at IS NULL"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks matching the filter, soonest due first.
    ///
    /// `today` evaluates the `overdue` status filter.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        today: Date,
    ) -> Result<Vec<Task>, sqlx::Error> {
        Self::list_inner(pool, filter, None, today).await
    }

    /// List tasks on the live AHP projects of one consortium.
    pub async fn list_in_consortium(
        pool: &PgPool,
        consortium: Consortium,
        filter: &TaskFilter,
        today: Date,
    ) -> Result<Vec<Task>, sqlx::Error> {
        Self::list_inner(pool, filter, Some(consortium), today).await
    }

    async fn list_inner(
        pool: &PgPool,
        filter: &TaskFilter,
        consortium: Option<Consortium>,
        today: Date,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let (stored_status, overdue_only) = match filter.status {
            Some(StatusFilter::Stored(status)) => (Some(status.as_str()), false),
            Some(StatusFilter::Overdue) => (None, true),
            None => (None, false),
        };
        let query = format!(
            "SELECT {T_COLUMNS} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.deleted_at IS NULL
               AND ($1::BIGINT IS NULL OR t.project_id = $1)
               AND ($2::BIGINT IS NULL OR t.assignee_id = $2)
               AND ($3::BIGINT IS NULL OR t.reviewer_id = $3)
               AND ($4::TEXT IS NULL OR t.status = $4)
               AND (NOT $5 OR (t.status <> 'completed' AND t.target_completion_date < $6))
               AND ($7::BOOLEAN IS NULL OR t.is_weekly_deliverable = $7)
               AND ($8::BIGINT IS NULL OR t.assignee_id = $8 OR t.reviewer_id = $8)
               AND ($9::TEXT IS NULL OR (p.project_type = 'AHP' AND p.consortium = $9))
             ORDER BY t.target_completion_date ASC NULLS LAST, t.id DESC
             LIMIT $10 OFFSET $11"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(filter.project_id)
            .bind(filter.assignee_id)
            .bind(filter.reviewer_id)
            .bind(stored_status)
            .bind(overdue_only)
            .bind(today)
            .bind(filter.is_weekly_deliverable)
            .bind(filter.visible_to)
            .bind(consortium.map(|c| c.as_str()))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Edit task details. Only provided fields are applied; status is untouched.
    ///
    /// Assignee, reviewer and due date use a provided flag plus a value so
    /// they can be cleared.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                assignee_id = CASE WHEN $5 THEN $6 ELSE assignee_id END,
                reviewer_id = CASE WHEN $7 THEN $8 ELSE reviewer_id END,
                target_completion_date = CASE WHEN $9 THEN $10 ELSE target_completion_date END,
                is_weekly_deliverable = COALESCE($11, is_weekly_deliverable)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.assignee_id.is_some())
            .bind(input.assignee_id.flatten())
            .bind(input.reviewer_id.is_some())
            .bind(input.reviewer_id.flatten())
            .bind(input.target_completion_date.is_some())
            .bind(input.target_completion_date.flatten())
            .bind(input.is_weekly_deliverable)
            .fetch_optional(pool)
            .await
    }

    /// Move a task from `expected` to `next`.
    ///
    /// Returns `None` when the row is no longer in `expected`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: TaskStatus,
        next: TaskStatus,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Attach a submitted file, replacing any previous one, and move the task
    /// to `submitted`.
    ///
    /// Returns the updated task together with the stored path it replaced,
    /// read under the same row lock, so the caller removes the file that was
    /// actually overwritten even when submissions race. Returns `None` when
    /// the row is no longer in `expected`.
    pub async fn record_submission(
        pool: &PgPool,
        id: DbId,
        expected: TaskStatus,
        submission: &TaskSubmission,
    ) -> Result<Option<(Task, Option<String>)>, sqlx::Error> {
        let query = format!(
            "WITH previous AS (
                SELECT id, stored_file_path FROM tasks
                WHERE id = $1 AND status = $2
                FOR UPDATE
             )
             UPDATE tasks t SET
                status = $3,
                uploaded_file_name = $4,
                stored_file_path = $5,
                uploaded_file_size = $6,
                submission_notes = $7,
                uploaded_at = NOW()
             FROM previous
             WHERE t.id = previous.id AND t.status = $2
             RETURNING {T_COLUMNS}, previous.stored_file_path AS replaced_file_path"
        );
        let recorded = sqlx::query_as::<_, RecordedSubmission>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(TaskStatus::Submitted.as_str())
            .bind(&submission.uploaded_file_name)
            .bind(&submission.stored_file_path)
            .bind(submission.uploaded_file_size)
            .bind(&submission.submission_notes)
            .fetch_optional(pool)
            .await?;
        Ok(recorded.map(|r| (r.task, r.replaced_file_path)))
    }
}

#[derive(sqlx::FromRow)]
struct RecordedSubmission {
    #[sqlx(flatten)]
    task: Task,
    replaced_file_path: Option<String>,
}

fn bind_create<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, Task, sqlx::postgres::PgArguments>,
    input: &'q CreateTask,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Task, sqlx::postgres::PgArguments> {
    query
        .bind(input.project_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.priority.as_str())
        .bind(input.assignee_id)
        .bind(input.reviewer_id)
        .bind(input.target_completion_date)
        .bind(input.is_weekly_deliverable)
        .bind(input.created_by)
}
