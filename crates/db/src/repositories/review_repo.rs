//! Repository for `task_reviews`.

use becs_core::task_workflow::TaskStatus;
use becs_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, TaskReview};
use crate::models::task::Task;

const TASK_COLUMNS: &str = "id, project_id, title, description, priority, status, assignee_id, \
                            reviewer_id, target_completion_date, is_weekly_deliverable, \
                            uploaded_file_name, stored_file_path, uploaded_file_size, \
                            submission_notes, uploaded_at, created_by, created_at, updated_at";

/// Select list joining the reviewer's display name.
const REVIEW_SELECT: &str =
    "r.id, r.task_id, r.reviewer_id, (u.first_name || ' ' || u.last_name) AS reviewer_name, \
     r.decision, r.comments, r.created_at";

/// Review history.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Review history for a task, newest first.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TaskReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_SELECT} FROM task_reviews r
             JOIN users u ON u.id = r.reviewer_id
             WHERE r.task_id = $1
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, TaskReview>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Append a review and move the task from `expected` to `next` in one
    /// transaction.
    ///
    /// Returns `None` (and writes nothing) when the task is no longer in
    /// `expected`.
    pub async fn record_decision(
        pool: &PgPool,
        input: &CreateReview,
        expected: TaskStatus,
        next: TaskStatus,
    ) -> Result<Option<(Task, TaskReview)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE tasks SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {TASK_COLUMNS}"
        );
        let Some(task) = sqlx::query_as::<_, Task>(&update)
            .bind(input.task_id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert = format!(
            "WITH r AS (
                INSERT INTO task_reviews (task_id, reviewer_id, decision, comments)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {REVIEW_SELECT} FROM r JOIN users u ON u.id = r.reviewer_id"
        );
        let review = sqlx::query_as::<_, TaskReview>(&insert)
            .bind(input.task_id)
            .bind(input.reviewer_id)
            .bind(input.decision.as_str())
            .bind(&input.comments)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((task, review)))
    }
}
