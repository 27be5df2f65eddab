//! Route definitions for the `/leave-templates` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::leave_template;
use crate::state::AppState;

/// Routes mounted at `/leave-templates`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(leave_template::list).post(leave_template::create))
        .route("/{id}", delete(leave_template::delete))
}
