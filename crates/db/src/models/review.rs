//! Task review history.

use becs_core::review::ReviewDecision;
use becs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `task_reviews`, joined with the reviewer's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskReview {
    pub id: DbId,
    pub task_id: DbId,
    pub reviewer_id: DbId,
    pub reviewer_name: String,
    #[sqlx(try_from = "String")]
    pub decision: ReviewDecision,
    pub comments: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateReview {
    pub task_id: DbId,
    pub reviewer_id: DbId,
    pub decision: ReviewDecision,
    pub comments: String,
}
