//! Handlers for the `/tasks` resource: CRUD, manual status moves, file
//! submission and download.
//!
//! Every status change goes through [`TaskStatus::next`] with the trigger that
//! caused it, then through a guarded row update that only applies if the task
//! is still in the status the decision was made against.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use becs_core::error::CoreError;
use becs_core::notification::{recipient, NotificationText};
use becs_core::task_workflow::{
    authorize_download, authorize_manual, authorize_submission, is_overdue, parse_manual_target,
    validate_title, StatusFilter, TaskActor, TaskPriority, TaskStatus, Transition,
};
use becs_core::types::{Date, DbId};
use becs_db::models::notification::CreateNotification;
use becs_db::models::task::{CreateTask, Task, TaskFilter, TaskSubmission, UpdateTask};
use becs_db::repositories::{ProjectRepo, TaskRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::notification::{draft, notify};
use super::{discard, read_upload, storage_error, today};
use crate::error::{AppError, AppResult};
use crate::extract::{nullable, QueryParams, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePrivileged;
use crate::query::PaginationParams;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;
use crate::storage::TASK_FILES;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A task plus the derived overdue flag.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
}

impl TaskResponse {
    pub fn new(task: Task, today: Date) -> Self {
        let is_overdue = is_overdue(task.status, task.target_completion_date, today);
        Self { task, is_overdue }
    }

    pub fn list(tasks: Vec<Task>, today: Date) -> Vec<Self> {
        tasks.into_iter().map(|t| Self::new(t, today)).collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub project_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    /// A stored status or `overdue`.
    pub status: Option<String>,
    pub is_weekly_deliverable: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TaskListParams {
    /// Build the repository filter. Ordinary staff only see tasks they are
    /// assigned to or reviewing.
    pub fn to_filter(&self, auth: &AuthUser) -> AppResult<TaskFilter> {
        let status = self.status.as_deref().map(StatusFilter::parse).transpose()?;
        let page = PaginationParams {
            limit: self.limit,
            offset: self.offset,
        };
        Ok(TaskFilter {
            project_id: self.project_id,
            assignee_id: self.assignee_id,
            reviewer_id: self.reviewer_id,
            status,
            is_weekly_deliverable: self.is_weekly_deliverable,
            visible_to: (!auth.is_privileged()).then_some(auth.user_id),
            limit: page.limit(),
            offset: page.offset(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub project_id: DbId,
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

/// Partial task edit. An explicit `null` clears the assignee, reviewer or
/// due date; an absent key leaves it alone.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "nullable")]
    pub assignee_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub reviewer_id: Option<Option<DbId>>,
    #[serde(default, alias = "due_date", deserialize_with = "nullable")]
    pub target_completion_date: Option<Option<Date>>,
    pub is_weekly_deliverable: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/tasks
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<TaskListParams>,
) -> AppResult<Json<DataResponse<Vec<TaskResponse>>>> {
    let today = today();
    let filter = params.to_filter(&auth)?;
    let tasks = TaskRepo::list(&state.pool, &filter, today).await?;
    Ok(ok(TaskResponse::list(tasks, today)))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    ValidJson(input): ValidJson<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskResponse>>)> {
    validate_title(&input.title)?;
    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or_else(|| {
            AppError::validation(format!("Project {} does not exist", input.project_id))
        })?;
    validate_participants(&state, input.assignee_id, input.reviewer_id).await?;

    let create = CreateTask {
        project_id: input.project_id,
        title: input.title.trim().to_string(),
        description: input.description,
        priority: input.priority.unwrap_or(TaskPriority::Medium),
        assignee_id: input.assignee_id,
        reviewer_id: input.reviewer_id,
        target_completion_date: input.target_completion_date,
        is_weekly_deliverable: input.is_weekly_deliverable,
        created_by: auth.user_id,
    };
    let task = TaskRepo::create(&state.pool, &create).await?;
    tracing::info!(
        task_id = task.id,
        project_id = task.project_id,
        assignee_id = ?task.assignee_id,
        created_by = auth.user_id,
        "Task created"
    );
    notify(&state, assignment_drafts(std::slice::from_ref(&task), auth.user_id)).await;
    Ok(created(TaskResponse::new(task, today())))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let task = load_task(&state, id).await?;
    if !actor(&auth, &task).can_view() {
        return Err(AppError::forbidden("Not permitted to view this task"));
    }
    Ok(ok(TaskResponse::new(task, today())))
}

/// PUT /api/tasks/{id}
///
/// Edits details only; status is never touched here.
pub async fn update(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateTaskRequest>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let before = load_task(&state, id).await?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    validate_participants(&state, input.assignee_id.flatten(), input.reviewer_id.flatten()).await?;

    let update = UpdateTask {
        title: input.title.map(|t| t.trim().to_string()),
        description: input.description,
        priority: input.priority,
        assignee_id: input.assignee_id,
        reviewer_id: input.reviewer_id,
        target_completion_date: input.target_completion_date,
        is_weekly_deliverable: input.is_weekly_deliverable,
    };
    let task = TaskRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    tracing::info!(task_id = id, updated_by = auth.user_id, "Task updated");
    if task.assignee_id != before.assignee_id {
        notify(&state, assignment_drafts(std::slice::from_ref(&task), auth.user_id)).await;
    }
    Ok(ok(TaskResponse::new(task, today())))
}

/// PATCH /api/tasks/{id}/status
///
/// Manual progression: start or resume work, or open a submission for
/// review. Re-setting the current status is a no-op.
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let target = parse_manual_target(input.status.trim())?;
    let task = load_task(&state, id).await?;
    let actor = actor(&auth, &task);
    if !actor.can_view() {
        return Err(AppError::forbidden("Not permitted to update this task"));
    }
    if task.status == target {
        return Ok(ok(TaskResponse::new(task, today())));
    }

    let next = task.status.next(Transition::Manual(target))?;
    authorize_manual(actor, next)?;

    let updated = TaskRepo::update_status(&state.pool, id, task.status, next)
        .await?
        .ok_or_else(|| concurrent_change(id))?;
    tracing::info!(
        task_id = id,
        user_id = auth.user_id,
        from = %task.status,
        to = %next,
        "Task status changed"
    );
    Ok(ok(TaskResponse::new(updated, today())))
}

/// POST /api/tasks/{id}/upload
///
/// Multipart form with a `file` part and optional `notes`. Only the assignee
/// may submit, and never once the task is completed. A re-upload replaces the
/// previous file.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let task = load_task(&state, id).await?;
    authorize_submission(actor(&auth, &task))?;
    task.status.next(Transition::Submission)?;

    let form = read_upload(multipart, state.config.max_upload_bytes).await?;
    let stored_path = state
        .storage
        .save(TASK_FILES, &form.file_name, &form.data)
        .await
        .map_err(storage_error)?;

    let submission = TaskSubmission {
        uploaded_file_name: form.file_name.clone(),
        stored_file_path: stored_path.clone(),
        uploaded_file_size: form.data.len() as i64,
        submission_notes: form.text("notes").map(str::to_string),
    };
    let recorded = TaskRepo::record_submission(&state.pool, id, task.status, &submission).await;

    let (updated, replaced) = match recorded {
        Ok(Some(recorded)) => recorded,
        Ok(None) => {
            discard(&state, &stored_path).await;
            return Err(concurrent_change(id));
        }
        Err(e) => {
            discard(&state, &stored_path).await;
            return Err(e.into());
        }
    };

    if let Some(previous) = replaced.as_deref() {
        discard(&state, previous).await;
    }
    tracing::info!(
        task_id = id,
        user_id = auth.user_id,
        file_name = %submission.uploaded_file_name,
        size = submission.uploaded_file_size,
        "Task file submitted"
    );
    if let Some(reviewer) = recipient(updated.reviewer_id, auth.user_id) {
        let text = NotificationText::task_submitted(&updated.title);
        notify(&state, vec![draft(reviewer, id, text)]).await;
    }
    Ok(ok(TaskResponse::new(updated, today())))
}

/// GET /api/tasks/{id}/download
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let task = load_task(&state, id).await?;
    authorize_download(actor(&auth, &task))?;

    let no_file = || AppError::Core(CoreError::NotFound { entity: "Task file", id });
    let (Some(stored), Some(name)) = (
        task.stored_file_path.as_deref(),
        task.uploaded_file_name.as_deref(),
    ) else {
        return Err(no_file());
    };
    state.storage.download(stored, name).await?.ok_or_else(no_file)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn load_task(state: &AppState, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Task", id))
}

pub(crate) fn actor(auth: &AuthUser, task: &Task) -> TaskActor {
    TaskActor::resolve(auth.user_id, auth.role, task.assignee_id, task.reviewer_id)
}

/// "Task assigned" notifications for the assignees of freshly assigned tasks.
pub(crate) fn assignment_drafts(tasks: &[Task], actor_id: DbId) -> Vec<CreateNotification> {
    tasks
        .iter()
        .filter_map(|task| {
            recipient(task.assignee_id, actor_id)
                .map(|user_id| draft(user_id, task.id, NotificationText::task_assigned(&task.title)))
        })
        .collect()
}

pub(crate) fn concurrent_change(id: DbId) -> AppError {
    AppError::conflict(format!(
        "Task {id} was changed by another request; reload and try again"
    ))
}

/// Assignees must be active users; reviewers must also be admins or directors.
pub(crate) async fn validate_participants(
    state: &AppState,
    assignee_id: Option<DbId>,
    reviewer_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = assignee_id {
        UserRepo::find_by_id(&state.pool, id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::validation(format!("Assignee {id} is not an active user")))?;
    }
    if let Some(id) = reviewer_id {
        let reviewer = UserRepo::find_by_id(&state.pool, id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::validation(format!("Reviewer {id} is not an active user")))?;
        if !reviewer.role.is_privileged() {
            return Err(AppError::validation(format!(
                "Reviewer {id} must be an admin or director"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use becs_core::roles::Role;
    use chrono::{NaiveDate, Utc};

    fn task(status: TaskStatus, due: Option<Date>) -> Task {
        Task {
            id: 1,
            project_id: 1,
            title: "Draft Report".into(),
            description: None,
            priority: TaskPriority::Medium,
            status,
            assignee_id: Some(7),
            reviewer_id: Some(2),
            target_completion_date: due,
            is_weekly_deliverable: false,
            uploaded_file_name: None,
            stored_file_path: Some("tasks/x.pdf".into()),
            uploaded_file_size: None,
            submission_notes: None,
            uploaded_at: None,
            created_by: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn response_flattens_task_and_hides_storage_path() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 3, 1);
        let json = serde_json::to_value(TaskResponse::new(task(TaskStatus::InProgress, due), today))
            .unwrap();

        assert_eq!(json["title"], "Draft Report");
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["is_overdue"], true);
        assert!(json.get("stored_file_path").is_none());
    }

    #[test]
    fn staff_filter_is_scoped_to_own_tasks() {
        let params = TaskListParams {
            status: Some("overdue".into()),
            ..Default::default()
        };
        let staff = AuthUser { user_id: 7, role: Role::Staff };
        let director = AuthUser { user_id: 2, role: Role::Director };

        let filter = params.to_filter(&staff).unwrap();
        assert_eq!(filter.visible_to, Some(7));
        assert_eq!(filter.status, Some(StatusFilter::Overdue));
        assert_eq!(params.to_filter(&director).unwrap().visible_to, None);
    }

    #[test]
    fn assignment_drafts_skip_unassigned_and_self() {
        let mut unassigned = task(TaskStatus::NotStarted, None);
        unassigned.assignee_id = None;
        let mut own = task(TaskStatus::NotStarted, None);
        own.id = 2;
        own.assignee_id = Some(2);
        let assigned = task(TaskStatus::NotStarted, None);

        let drafts = assignment_drafts(&[unassigned, own, assigned], 2);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user_id, 7);
        assert_eq!(drafts[0].task_id, Some(1));
        assert!(drafts[0].message.contains("Draft Report"));
    }

    #[test]
    fn unknown_status_filter_is_rejected() {
        let params = TaskListParams {
            status: Some("archived".into()),
            ..Default::default()
        };
        let staff = AuthUser { user_id: 7, role: Role::Staff };
        assert!(params.to_filter(&staff).is_err());
    }
}
