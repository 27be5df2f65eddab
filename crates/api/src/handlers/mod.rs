//! HTTP handlers, one module per resource.

pub mod attendance;
pub mod auth;
pub mod bulk_import;
pub mod consortium;
pub mod dashboard;
pub mod invoice;
pub mod leave;
pub mod leave_template;
pub mod notification;
pub mod project;
pub mod review;
pub mod task;
pub mod template;
pub mod user;

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use becs_core::error::CoreError;
use becs_core::types::Date;
use becs_core::upload::{sanitize_file_name, validate_upload_size};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Calendar date used for the overdue overlay and attendance.
pub(crate) fn today() -> Date {
    chrono::Utc::now().date_naive()
}

/// A parsed multipart upload: the `file` part plus any text fields.
#[derive(Debug)]
pub(crate) struct UploadForm {
    pub file_name: String,
    pub data: Bytes,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Non-blank text field, trimmed.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Read a multipart body holding one `file` part and text fields.
///
/// A missing or empty file is a 422; a file over `max_bytes` is a 413.
pub(crate) async fn read_upload(mut multipart: Multipart, max_bytes: u64) -> AppResult<UploadForm> {
    let mut file: Option<(String, Bytes)> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let raw_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            file = Some((raw_name, data));
        } else if !name.is_empty() {
            let text = field.text().await.map_err(multipart_error)?;
            fields.insert(name, text);
        }
    }

    let (raw_name, data) =
        file.ok_or_else(|| AppError::validation("Missing required 'file' field"))?;
    validate_upload_size(data.len() as u64, max_bytes)?;
    let file_name = sanitize_file_name(&raw_name)
        .ok_or_else(|| AppError::validation("Uploaded file must have a file name"))?;

    Ok(UploadForm {
        file_name,
        data,
        fields,
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Core(CoreError::TooLarge(err.body_text()))
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Best-effort removal of a stored file that is no longer referenced.
async fn discard(state: &AppState, stored_path: &str) {
    if let Err(e) = state.storage.remove(stored_path).await {
        tracing::warn!(path = %stored_path, error = %e, "Failed to remove stored file");
    }
}

fn storage_error(err: std::io::Error) -> AppError {
    AppError::InternalError(format!("File storage error: {err}"))
}
