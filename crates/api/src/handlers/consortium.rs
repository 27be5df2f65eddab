//! Handlers for `/consortiums/{n}/deliverables`.
//!
//! A deliverable is defined once per consortium and becomes one task on each
//! of the consortium's AHP projects.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::error::CoreError;
use becs_core::project::Consortium;
use becs_core::task_workflow::{validate_title, TaskPriority};
use becs_core::types::{Date, DbId};
use becs_db::models::task::CreateTask;
use becs_db::repositories::{ProjectRepo, TaskRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::notification::notify;
use super::task::{assignment_drafts, validate_participants, TaskListParams, TaskResponse};
use super::today;
use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePrivileged;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct DeliverableInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    #[serde(alias = "due_date")]
    pub target_completion_date: Option<Date>,
    #[serde(default)]
    pub is_weekly_deliverable: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeliverablesRequest {
    #[validate(nested)]
    pub deliverables: Vec<DeliverableInput>,
}

#[derive(Debug, Serialize)]
pub struct CreatedDeliverables {
    pub consortium: Consortium,
    pub projects: usize,
    pub created: usize,
    pub tasks: Vec<TaskResponse>,
}

/// GET /api/consortiums/{n}/deliverables
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(number): Path<i64>,
    QueryParams(params): QueryParams<TaskListParams>,
) -> AppResult<Json<DataResponse<Vec<TaskResponse>>>> {
    let consortium = Consortium::from_number(number)?;
    let today = today();
    let filter = params.to_filter(&auth)?;
    let tasks = TaskRepo::list_in_consortium(&state.pool, consortium, &filter, today).await?;
    Ok(ok(TaskResponse::list(tasks, today)))
}

/// POST /api/consortiums/{n}/deliverables
///
/// Rows with a blank title are skipped. All tasks are created in one
/// transaction.
pub async fn create(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(number): Path<i64>,
    ValidJson(input): ValidJson<CreateDeliverablesRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedDeliverables>>)> {
    let consortium = Consortium::from_number(number)?;

    let deliverables: Vec<DeliverableInput> = input
        .deliverables
        .into_iter()
        .filter(|d| !d.title.trim().is_empty())
        .collect();
    if deliverables.is_empty() {
        return Err(AppError::validation(
            "At least one deliverable with a title is required",
        ));
    }
    for deliverable in &deliverables {
        validate_title(&deliverable.title)?;
        validate_participants(&state, deliverable.assignee_id, deliverable.reviewer_id).await?;
    }

    let project_ids = ProjectRepo::ids_in_consortium(&state.pool, consortium).await?;
    if project_ids.is_empty() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Projects in consortium",
            id: number,
        }));
    }

    let inputs: Vec<CreateTask> = project_ids
        .iter()
        .flat_map(|&project_id| {
            deliverables.iter().map(move |d| CreateTask {
                project_id,
                title: d.title.trim().to_string(),
                description: d.description.clone(),
                priority: d.priority.unwrap_or(TaskPriority::Medium),
                assignee_id: d.assignee_id,
                reviewer_id: d.reviewer_id,
                target_completion_date: d.target_completion_date,
                is_weekly_deliverable: d.is_weekly_deliverable,
                created_by: auth.user_id,
            })
        })
        .collect();
    let tasks = TaskRepo::create_many(&state.pool, &inputs).await?;

    tracing::info!(
        consortium = %consortium,
        projects = project_ids.len(),
        deliverables = deliverables.len(),
        created = tasks.len(),
        created_by = auth.user_id,
        "Consortium deliverables created"
    );
    notify(&state, assignment_drafts(&tasks, auth.user_id)).await;
    Ok(created(CreatedDeliverables {
        consortium,
        projects: project_ids.len(),
        created: tasks.len(),
        tasks: TaskResponse::list(tasks, today()),
    }))
}
