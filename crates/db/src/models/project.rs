//! Project entity model and DTOs.

use becs_core::project::{Consortium, ProjectStatus, ProjectType};
use becs_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub code: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub project_type: ProjectType,
    /// `consortium_1` .. `consortium_5`; only set on AHP projects.
    pub consortium: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub code: String,
    pub name: String,
    pub project_type: ProjectType,
    pub consortium: Option<Consortium>,
    pub status: ProjectStatus,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// DTO for updating an existing project. All fields are optional.
///
/// Switching a project to `Private` clears its consortium.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub code: Option<String>,
    pub name: Option<String>,
    pub project_type: Option<ProjectType>,
    pub consortium: Option<Consortium>,
    pub status: Option<ProjectStatus>,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// Optional filters for listing projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub project_type: Option<ProjectType>,
    pub consortium: Option<Consortium>,
    pub status: Option<ProjectStatus>,
}

/// Per-status task counts for one project.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ProjectTaskCounts {
    pub total: i64,
    pub not_started: i64,
    pub in_progress: i64,
    pub submitted: i64,
    pub under_review: i64,
    pub needs_rework: i64,
    pub completed: i64,
    pub overdue: i64,
}
