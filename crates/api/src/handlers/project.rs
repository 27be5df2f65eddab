//! Handlers for the `/projects` resource.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::project::{
    completion_percentage, validate_consortium, validate_date_range, validate_project_code,
    Consortium, ProjectStatus, ProjectType, UNASSIGNED_BUCKET,
};
use becs_core::types::{Date, DbId};
use becs_core::validation::not_blank;
use becs_db::models::project::{
    CreateProject, Project, ProjectFilter, ProjectTaskCounts, UpdateProject,
};
use becs_db::repositories::ProjectRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::today;
use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePrivileged;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    #[serde(alias = "type")]
    pub project_type: Option<ProjectType>,
    pub consortium: Option<Consortium>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(max = 50))]
    pub code: String,
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,
    #[serde(alias = "type")]
    pub project_type: ProjectType,
    pub consortium: Option<Consortium>,
    pub status: Option<ProjectStatus>,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(max = 50))]
    pub code: Option<String>,
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub project_type: Option<ProjectType>,
    pub consortium: Option<Consortium>,
    pub status: Option<ProjectStatus>,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// AHP projects by consortium bucket, plus the private list.
#[derive(Debug, Serialize)]
pub struct GroupedProjects {
    /// Keys `consortium_1`..`consortium_5` and `unassigned`, always present.
    pub ahp: BTreeMap<String, Vec<Project>>,
    pub private: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct ProjectProgress {
    pub project_id: DbId,
    pub tasks: ProjectTaskCounts,
    pub completion_percentage: i64,
}

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ProjectListParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let filter = ProjectFilter {
        project_type: params.project_type,
        consortium: params.consortium,
        status: params.status,
    };
    let projects = ProjectRepo::list(&state.pool, &filter).await?;
    Ok(ok(projects))
}

/// GET /api/projects/grouped
pub async fn grouped(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<GroupedProjects>>> {
    let projects = ProjectRepo::list(&state.pool, &ProjectFilter::default()).await?;
    Ok(ok(group_by_consortium(projects)))
}

fn group_by_consortium(projects: Vec<Project>) -> GroupedProjects {
    let mut ahp: BTreeMap<String, Vec<Project>> = Consortium::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), Vec::new()))
        .collect();
    ahp.insert(UNASSIGNED_BUCKET.to_string(), Vec::new());
    let mut private = Vec::new();

    for project in projects {
        match project.project_type {
            ProjectType::Private => private.push(project),
            ProjectType::Ahp => {
                let bucket = project
                    .consortium
                    .clone()
                    .unwrap_or_else(|| UNASSIGNED_BUCKET.to_string());
                ahp.entry(bucket).or_default().push(project);
            }
        }
    }
    GroupedProjects { ahp, private }
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    ValidJson(input): ValidJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    validate_project_code(&input.code)?;
    validate_consortium(input.project_type, input.consortium)?;
    validate_date_range(input.start_date, input.end_date, "Project")?;

    let create = CreateProject {
        code: input.code.trim().to_string(),
        name: input.name.trim().to_string(),
        project_type: input.project_type,
        consortium: input.consortium,
        status: input.status.unwrap_or(ProjectStatus::Planning),
        client_name: input.client_name,
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
    };
    let project = ProjectRepo::create(&state.pool, &create).await?;
    tracing::info!(
        project_id = project.id,
        code = %project.code,
        created_by = auth.user_id,
        "Project created"
    );
    Ok(created(project))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = find_project(&state, id).await?;
    Ok(ok(project))
}

/// PUT /api/projects/{id}
///
/// Type, consortium and dates are validated against the merged result, so a
/// partial update cannot leave the project inconsistent.
pub async fn update(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateProjectRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let existing = find_project(&state, id).await?;

    if let Some(code) = &input.code {
        validate_project_code(code)?;
    }
    let project_type = input.project_type.unwrap_or(existing.project_type);
    validate_consortium(project_type, input.consortium)?;
    validate_date_range(
        input.start_date.or(existing.start_date),
        input.end_date.or(existing.end_date),
        "Project",
    )?;

    let update = UpdateProject {
        code: input.code.map(|c| c.trim().to_string()),
        name: input.name.map(|n| n.trim().to_string()),
        project_type: input.project_type,
        consortium: input.consortium,
        status: input.status,
        client_name: input.client_name,
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
    };
    let project = ProjectRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::not_found("Project", id))?;
    tracing::info!(project_id = id, updated_by = auth.user_id, "Project updated");
    Ok(ok(project))
}

/// DELETE /api/projects/{id}
///
/// Soft delete. The project's tasks drop out of listings with it.
pub async fn delete(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProjectRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(project_id = id, deleted_by = auth.user_id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Project", id))
    }
}

/// GET /api/projects/{id}/progress
pub async fn progress(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectProgress>>> {
    find_project(&state, id).await?;
    let tasks = ProjectRepo::task_counts(&state.pool, id, today()).await?;
    let completion_percentage = completion_percentage(tasks.completed, tasks.total);
    Ok(ok(ProjectProgress {
        project_id: id,
        tasks,
        completion_percentage,
    }))
}

async fn find_project(state: &AppState, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Project", id))
}
