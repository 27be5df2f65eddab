//! Template library model and DTOs.

use becs_core::template::TemplateCategory;
use becs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub category: TemplateCategory,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub stored_file_path: String,
    pub file_size: i64,
    pub uploaded_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateTemplate {
    pub name: String,
    pub description: Option<String>,
    pub category: TemplateCategory,
    pub file_name: String,
    pub stored_file_path: String,
    pub file_size: i64,
    pub uploaded_by: DbId,
}
