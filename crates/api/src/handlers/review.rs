//! Handlers for `/tasks/{id}/reviews`: review history and review decisions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::notification::{recipient, NotificationText};
use becs_core::review::{validate_comments, ReviewDecision};
use becs_core::task_workflow::{authorize_review, Transition};
use becs_core::types::DbId;
use becs_db::models::review::{CreateReview, TaskReview};
use becs_db::repositories::ReviewRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::notification::{draft, notify};
use super::task::{actor, concurrent_change, load_task, TaskResponse};
use super::today;
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub comments: String,
}

/// The new review row and the task it moved.
#[derive(Debug, Serialize)]
pub struct ReviewOutcome {
    pub review: TaskReview,
    pub task: TaskResponse,
}

/// GET /api/tasks/{id}/reviews
///
/// Newest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TaskReview>>>> {
    let task = load_task(&state, task_id).await?;
    if !actor(&auth, &task).can_view() {
        return Err(AppError::forbidden("Not permitted to view this task"));
    }
    let reviews = ReviewRepo::list_for_task(&state.pool, task_id).await?;
    Ok(ok(reviews))
}

/// POST /api/tasks/{id}/reviews
///
/// Records a decision on a submitted task. The review row and the status
/// change commit together.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<DbId>,
    ValidJson(input): ValidJson<ReviewRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ReviewOutcome>>)> {
    let task = load_task(&state, task_id).await?;
    authorize_review(actor(&auth, &task))?;
    let next = task.status.next(Transition::Review(input.decision))?;
    let comments = validate_comments(&input.comments)?;

    let review = CreateReview {
        task_id,
        reviewer_id: auth.user_id,
        decision: input.decision,
        comments: comments.to_string(),
    };
    let (updated, review) = ReviewRepo::record_decision(&state.pool, &review, task.status, next)
        .await?
        .ok_or_else(|| concurrent_change(task_id))?;

    tracing::info!(
        task_id,
        reviewer_id = auth.user_id,
        decision = %input.decision,
        from = %task.status,
        to = %next,
        "Task reviewed"
    );
    if let Some(assignee) = recipient(updated.assignee_id, auth.user_id) {
        let text = NotificationText::task_reviewed(&updated.title, input.decision);
        notify(&state, vec![draft(assignee, task_id, text)]).await;
    }
    Ok(created(ReviewOutcome {
        review,
        task: TaskResponse::new(updated, today()),
    }))
}
