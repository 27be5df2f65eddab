//! Handlers for the `/templates` library: categorized document uploads.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use becs_core::error::CoreError;
use becs_core::template::TemplateCategory;
use becs_core::types::DbId;
use becs_db::models::template::{CreateTemplate, Template};
use becs_db::repositories::TemplateRepo;
use serde::Deserialize;

use super::{discard, read_upload, storage_error};
use crate::error::{AppError, AppResult};
use crate::extract::QueryParams;
use crate::middleware::auth::AuthUser;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;
use crate::storage::TEMPLATE_FILES;

/// Longest template name accepted, matching the column width.
const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Default, Deserialize)]
pub struct TemplateListParams {
    pub category: Option<TemplateCategory>,
}

/// GET /api/templates
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<TemplateListParams>,
) -> AppResult<Json<DataResponse<Vec<Template>>>> {
    let templates = TemplateRepo::list(&state.pool, params.category).await?;
    Ok(ok(templates))
}

/// POST /api/templates/upload
///
/// Multipart fields: `file` (required), `name` (defaults to the file name),
/// `description`, `category` (defaults to `Other`).
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Template>>)> {
    let form = read_upload(multipart, state.config.max_upload_bytes).await?;

    let category = form
        .text("category")
        .map(TemplateCategory::parse)
        .transpose()?
        .unwrap_or(TemplateCategory::Other);
    let name = form.text("name").unwrap_or(form.file_name.as_str()).to_string();
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Template name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }

    let stored_path = state
        .storage
        .save(TEMPLATE_FILES, &form.file_name, &form.data)
        .await
        .map_err(storage_error)?;

    let create = CreateTemplate {
        name,
        description: form.text("description").map(str::to_string),
        category,
        file_name: form.file_name.clone(),
        stored_file_path: stored_path.clone(),
        file_size: form.data.len() as i64,
        uploaded_by: auth.user_id,
    };
    let template = match TemplateRepo::create(&state.pool, &create).await {
        Ok(template) => template,
        Err(e) => {
            discard(&state, &stored_path).await;
            return Err(e.into());
        }
    };
    tracing::info!(
        template_id = template.id,
        category = %template.category,
        size = template.file_size,
        uploaded_by = auth.user_id,
        "Template uploaded"
    );
    Ok(created(template))
}

/// GET /api/templates/{id}/download
pub async fn download(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Template", id))?;
    state
        .storage
        .download(&template.stored_file_path, &template.file_name)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template file",
            id,
        }))
}

/// DELETE /api/templates/{id}
///
/// Admins, directors and the original uploader may delete.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Template", id))?;
    if !auth.is_privileged() && template.uploaded_by != auth.user_id {
        return Err(AppError::forbidden(
            "Only admins, directors or the uploader may delete a template",
        ));
    }

    let deleted = TemplateRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Template", id))?;
    discard(&state, &deleted.stored_file_path).await;
    tracing::info!(template_id = id, deleted_by = auth.user_id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}
