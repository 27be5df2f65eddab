//! Repository for the `templates` table.

use becs_core::template::TemplateCategory;
use becs_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::{CreateTemplate, Template};

const COLUMNS: &str = "id, name, description, category, file_name, stored_file_path, file_size, \
                       uploaded_by, created_at, updated_at";

pub struct TemplateRepo;

impl TemplateRepo {
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (name, description, category, file_name, stored_file_path,
                                    file_size, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.category.as_str())
            .bind(&input.file_name)
            .bind(&input.stored_file_path)
            .bind(input.file_size)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Templates ordered by category then name.
    pub async fn list(
        pool: &PgPool,
        category: Option<TemplateCategory>,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY category, name, id"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(category.map(|c| c.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Delete a template row, returning it so the caller can remove the file.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("DELETE FROM templates WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
