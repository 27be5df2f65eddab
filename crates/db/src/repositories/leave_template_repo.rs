//! Repository for `leave_templates`.

use becs_core::leave::LeaveType;
use becs_core::types::DbId;
use sqlx::PgPool;

use crate::models::leave_template::{CreateLeaveTemplate, LeaveTemplate};

const COLUMNS: &str = "id, name, leave_type, template_content, created_by, created_at, updated_at";

pub struct LeaveTemplateRepo;

impl LeaveTemplateRepo {
    /// Insert a template. A duplicate name violates `uq_leave_templates_name`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateLeaveTemplate,
    ) -> Result<LeaveTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO leave_templates (name, leave_type, template_content, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveTemplate>(&query)
            .bind(&input.name)
            .bind(input.leave_type.as_str())
            .bind(&input.template_content)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Templates ordered by name, optionally for one leave type.
    pub async fn list(
        pool: &PgPool,
        leave_type: Option<LeaveType>,
    ) -> Result<Vec<LeaveTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_templates
             WHERE ($1::TEXT IS NULL OR leave_type = $1)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, LeaveTemplate>(&query)
            .bind(leave_type.map(|t| t.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leave_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
