//! Route definitions for the `/attendance` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// GET  /                 -> list
/// GET  /summary          -> summary
/// GET  /today/{user_id}  -> today_for_user
/// POST /clock-in         -> clock_in
/// POST /clock-out        -> clock_out
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(attendance::list))
        .route("/summary", get(attendance::summary))
        .route("/today/{user_id}", get(attendance::today_for_user))
        .route("/clock-in", post(attendance::clock_in))
        .route("/clock-out", post(attendance::clock_out))
}
