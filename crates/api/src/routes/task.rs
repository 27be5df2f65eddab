//! Route definitions for the `/tasks` resource, including reviews.

use axum::routing::{get, patch};
use axum::Router;

use super::upload_post;
use crate::config::ServerConfig;
use crate::handlers::{review, task};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// PATCH  /{id}/status     -> update_status
/// POST   /{id}/upload     -> upload (multipart)
/// GET    /{id}/download   -> download
/// GET    /{id}/reviews    -> review::list
/// POST   /{id}/reviews    -> review::create
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(task::list).post(task::create))
        .route("/{id}", get(task::get_by_id).put(task::update))
        .route("/{id}/status", patch(task::update_status))
        .route("/{id}/upload", upload_post(task::upload, config))
        .route("/{id}/download", get(task::download))
        .route("/{id}/reviews", get(review::list).post(review::create))
}
