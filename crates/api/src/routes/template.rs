//! Route definitions for the `/templates` library.

use axum::routing::{delete, get};
use axum::Router;

use super::upload_post;
use crate::config::ServerConfig;
use crate::handlers::template;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                -> list
/// POST   /upload          -> upload (multipart)
/// DELETE /{id}            -> delete
/// GET    /{id}/download   -> download
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(template::list))
        .route("/upload", upload_post(template::upload, config))
        .route("/{id}", delete(template::delete))
        .route("/{id}/download", get(template::download))
}
