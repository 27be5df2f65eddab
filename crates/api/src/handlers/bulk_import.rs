//! `POST /bulk-import`: CSV import of staff, projects or tasks.
//!
//! Each row is validated and inserted on its own; failures are reported by
//! row number and never abort the remaining rows.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use becs_core::bulk_import::{CsvTable, ImportType, ProjectRow, RowError, StaffRow, TaskRow};
use becs_core::error::CoreError;
use becs_core::roles::Role;
use becs_core::validation::not_blank;
use becs_db::models::project::CreateProject;
use becs_db::models::task::{CreateTask, Task};
use becs_db::models::user::CreateUser;
use becs_db::repositories::{ProjectRepo, TaskRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::notification::notify;
use super::task::assignment_drafts;
use crate::auth::password::hash_password;
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePrivileged;
use crate::response::{ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct BulkImportRequest {
    pub import_type: ImportType,
    #[validate(custom(function = "not_blank"))]
    pub csv_data: String,
}

#[derive(Debug, Serialize)]
pub struct BulkImportReport {
    pub import_type: ImportType,
    pub total_rows: usize,
    pub created: usize,
    pub errors: Vec<RowError>,
}

/// POST /api/bulk-import
pub async fn import(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    ValidJson(input): ValidJson<BulkImportRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkImportReport>>)> {
    let table = CsvTable::parse(&input.csv_data)?;
    table.require_columns(input.import_type)?;
    if table.is_empty() {
        return Err(CoreError::Validation("CSV contains no data rows".to_string()).into());
    }

    let (created, mut errors) = match input.import_type {
        ImportType::Staff => import_staff(&state, &auth, &table).await,
        ImportType::Projects => import_projects(&state, &table).await,
        ImportType::Tasks => import_tasks(&state, &auth, &table).await,
    };
    errors.sort_by_key(|e| e.row);

    tracing::info!(
        import_type = %input.import_type,
        rows = table.len(),
        created,
        failed = errors.len(),
        imported_by = auth.user_id,
        "Bulk import finished"
    );
    let status = if created > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        ok(BulkImportReport {
            import_type: input.import_type,
            total_rows: table.len(),
            created,
            errors,
        }),
    ))
}

async fn import_staff(
    state: &AppState,
    auth: &AuthUser,
    table: &CsvTable,
) -> (usize, Vec<RowError>) {
    let (rows, mut errors) = table.parse_rows(StaffRow::from_row);
    let mut created = 0;

    for (row, staff) in rows {
        if staff.role == Role::Admin && auth.role != Role::Admin {
            errors.push(RowError {
                row,
                message: "Only admins may create admin accounts".to_string(),
            });
            continue;
        }
        let password_hash = match hash_password(&staff.password) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::error!(row, error = %e, "Password hashing failed during import");
                errors.push(RowError {
                    row,
                    message: "Password could not be processed".to_string(),
                });
                continue;
            }
        };
        let create = CreateUser {
            first_name: staff.first_name,
            last_name: staff.last_name,
            staff_id: staff.staff_id,
            email: staff.email,
            password_hash,
            role: staff.role,
            department: staff.department,
            position: staff.position,
            phone_number: staff.phone_number,
        };
        match UserRepo::create(&state.pool, &create).await {
            Ok(_) => created += 1,
            Err(e) => errors.push(insert_error(row, &e)),
        }
    }
    (created, errors)
}

async fn import_projects(state: &AppState, table: &CsvTable) -> (usize, Vec<RowError>) {
    let (rows, mut errors) = table.parse_rows(ProjectRow::from_row);
    let mut created = 0;

    for (row, project) in rows {
        let create = CreateProject {
            code: project.code,
            name: project.name,
            project_type: project.project_type,
            consortium: project.consortium,
            status: project.status,
            client_name: project.client_name,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
        };
        match ProjectRepo::create(&state.pool, &create).await {
            Ok(_) => created += 1,
            Err(e) => errors.push(insert_error(row, &e)),
        }
    }
    (created, errors)
}

async fn import_tasks(
    state: &AppState,
    auth: &AuthUser,
    table: &CsvTable,
) -> (usize, Vec<RowError>) {
    let (rows, mut errors) = table.parse_rows(TaskRow::from_row);
    let mut created = Vec::new();

    for (row, task) in rows {
        match create_task_row(state, auth, task).await {
            Ok(task) => created.push(task),
            Err(message) => errors.push(RowError { row, message }),
        }
    }
    notify(state, assignment_drafts(&created, auth.user_id)).await;
    (created.len(), errors)
}

/// Resolve the project code and assignee staff id, then insert.
async fn create_task_row(state: &AppState, auth: &AuthUser, task: TaskRow) -> Result<Task, String> {
    let project = ProjectRepo::find_by_code(&state.pool, &task.project_code)
        .await
        .map_err(|e| db_message(&e))?
        .ok_or_else(|| format!("Project code '{}' does not exist", task.project_code))?;

    let assignee_id = match task.assigned_to.as_deref() {
        Some(staff_id) => {
            let user = UserRepo::find_by_staff_id(&state.pool, staff_id)
                .await
                .map_err(|e| db_message(&e))?
                .filter(|u| u.is_active)
                .ok_or_else(|| format!("No active staff member with staff id '{staff_id}'"))?;
            Some(user.id)
        }
        None => None,
    };

    let create = CreateTask {
        project_id: project.id,
        title: task.title,
        description: task.description,
        priority: task.priority,
        assignee_id,
        reviewer_id: None,
        target_completion_date: task.target_date,
        is_weekly_deliverable: false,
        created_by: auth.user_id,
    };
    TaskRepo::create(&state.pool, &create)
        .await
        .map_err(|e| db_message(&e))
}

fn insert_error(row: usize, err: &sqlx::Error) -> RowError {
    RowError {
        row,
        message: db_message(err),
    }
}

/// Row-level wording for insert failures; unexpected errors are logged.
fn db_message(err: &sqlx::Error) -> String {
    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some("23505") => return format!("Duplicate value ({constraint})"),
            Some("23503") | Some("23514") => return format!("Invalid value ({constraint})"),
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error during bulk import");
    "Database error".to_string()
}
