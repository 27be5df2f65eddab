pub mod attendance;
pub mod auth;
pub mod consortium;
pub mod dashboard;
pub mod health;
pub mod invoice;
pub mod leave;
pub mod leave_template;
pub mod notification;
pub mod project;
pub mod task;
pub mod template;
pub mod user;

use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};
use axum::Router;
use becs_core::error::CoreError;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handlers;
use crate::state::AppState;

/// Room for multipart framing and text fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login, /auth/refresh, /auth/user, /auth/logout
///
/// /users                                   list, create
/// /users/{id}                              get, update, deactivate
/// /users/{id}/reset-password               reset password (admin)
///
/// /projects                                list, create
/// /projects/grouped                        AHP by consortium + private
/// /projects/{id}                           get, update, soft delete
/// /projects/{id}/progress                  task counts
///
/// /tasks                                   list, create
/// /tasks/{id}                              get, update
/// /tasks/{id}/status                       manual status change (PATCH)
/// /tasks/{id}/upload                       submit file (multipart)
/// /tasks/{id}/download                     download submitted file
/// /tasks/{id}/reviews                      history, review decision
///
/// /consortiums/{n}/deliverables            list, batch create
///
/// /attendance                              list
/// /attendance/summary                      hours rollup
/// /attendance/today/{user_id}              today's records
/// /attendance/clock-in, /clock-out         open / close own record
///
/// /invoices                                list, create
/// /invoices/summary                        totals per status
/// /invoices/{id}                           get, update, delete
///
/// /leave-applications                      list, apply
/// /leave-applications/{id}                 get
/// /leave-applications/{id}/decision        approve / reject
/// /leave-applications/{id}/cancel          cancel own pending
/// /leave-templates                         list, create
/// /leave-templates/{id}                    delete
///
/// /notifications                           own notifications
/// /notifications/unread-count              unread badge count
/// /notifications/read-all                  mark all read
/// /notifications/{id}/read                 mark one read
///
/// /templates                               list
/// /templates/upload                        upload (multipart)
/// /templates/{id}                          delete
/// /templates/{id}/download                 download
///
/// /dashboard/stats                         rollups
/// /bulk-import                             CSV import
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router(config))
        .nest("/consortiums", consortium::router())
        .nest("/attendance", attendance::router())
        .nest("/invoices", invoice::router())
        .nest("/leave-applications", leave::router())
        .nest("/leave-templates", leave_template::router())
        .nest("/notifications", notification::router())
        .nest("/templates", template::router(config))
        .nest("/dashboard", dashboard::router())
        .route(
            "/bulk-import",
            upload_post(handlers::bulk_import::import, config),
        )
}

/// A POST route whose body limit is sized to the configured upload cap
/// instead of axum's default.
///
/// Requests over the limit are answered with 413 before the handler runs,
/// in the same JSON error envelope as every other failure.
pub(crate) fn upload_post<H, T>(handler: H, config: &ServerConfig) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    let limit = config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    post(handler)
        .layer::<_, std::convert::Infallible>(RequestBodyLimitLayer::new(limit))
        .layer(DefaultBodyLimit::disable())
        .layer(map_response(payload_too_large_as_json))
}

/// Rewrite the body limit layer's plain-text 413. Handler errors are already
/// JSON and pass through untouched.
async fn payload_too_large_as_json(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json {
        return response;
    }
    AppError::Core(CoreError::TooLarge(
        "Request body exceeds the upload size limit".into(),
    ))
    .into_response()
}
