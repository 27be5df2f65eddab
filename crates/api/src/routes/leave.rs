//! Route definitions for the `/leave-applications` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::leave;
use crate::state::AppState;

/// Routes mounted at `/leave-applications`.
///
/// ```text
/// GET  /                -> list
/// POST /                -> apply
/// GET  /{id}            -> get_by_id
/// POST /{id}/decision   -> decide
/// POST /{id}/cancel     -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(leave::list).post(leave::apply))
        .route("/{id}", get(leave::get_by_id))
        .route("/{id}/decision", post(leave::decide))
        .route("/{id}/cancel", post(leave::cancel))
}
