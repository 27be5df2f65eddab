//! Route definitions for `/consortiums`.

use axum::routing::get;
use axum::Router;

use crate::handlers::consortium;
use crate::state::AppState;

/// Routes mounted at `/consortiums`.
///
/// ```text
/// GET  /{n}/deliverables  -> list
/// POST /{n}/deliverables  -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{n}/deliverables",
        get(consortium::list).post(consortium::create),
    )
}
