//! Repository for the `projects` table.

use becs_core::project::Consortium;
use becs_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::project::{
    CreateProject, Project, ProjectFilter, ProjectTaskCounts, UpdateProject,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, project_type, consortium, status, client_name, \
                       description, start_date, end_date, created_at, updated_at";

/// Provides CRUD operations for projects. Soft-deleted rows are invisible.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (code, name, project_type, consortium, status, client_name,
                                   description, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.project_type.as_str())
            .bind(input.consortium.map(|c| c.as_str()))
            .bind(input.status.as_str())
            .bind(&input.client_name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its unique code. Excludes soft-deleted rows.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Project>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM projects WHERE code = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List projects matching the filter, most recently created first.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NULL
               AND ($1::TEXT IS NULL OR project_type = $1)
               AND ($2::TEXT IS NULL OR consortium = $2)
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(filter.project_type.map(|t| t.as_str()))
            .bind(filter.consortium.map(|c| c.as_str()))
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// IDs of the live AHP projects in a consortium bucket.
    pub async fn ids_in_consortium(
        pool: &PgPool,
        consortium: Consortium,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM projects
             WHERE deleted_at IS NULL AND project_type = 'AHP' AND consortium = $1
             ORDER BY id",
        )
        .bind(consortium.as_str())
        .fetch_all(pool)
        .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// A project whose resulting type is `Private` has its consortium cleared.
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                project_type = COALESCE($4, project_type),
                consortium = CASE
                    WHEN COALESCE($4, project_type) = 'Private' THEN NULL
                    ELSE COALESCE($5, consortium)
                END,
                status = COALESCE($6, status),
                client_name = COALESCE($7, client_name),
                description = COALESCE($8, description),
                start_date = COALESCE($9, start_date),
                end_date = COALESCE($10, end_date)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.project_type.map(|t| t.as_str()))
            .bind(input.consortium.map(|c| c.as_str()))
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.client_name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a project by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Task counts per status for one project, with the overdue overlay
    /// evaluated against `today`.
    pub async fn task_counts(
        pool: &PgPool,
        project_id: DbId,
        today: Date,
    ) -> Result<ProjectTaskCounts, sqlx::Error> {
        sqlx::query_as::<_, ProjectTaskCounts>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'not_started') AS not_started,
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'submitted') AS submitted,
                COUNT(*) FILTER (WHERE status = 'under_review') AS under_review,
                COUNT(*) FILTER (WHERE status = 'needs_rework') AS needs_rework,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (
                    WHERE status <> 'completed' AND target_completion_date < $2
                ) AS overdue
             FROM tasks WHERE project_id = $1",
        )
        .bind(project_id)
        .bind(today)
        .fetch_one(pool)
        .await
    }
}
