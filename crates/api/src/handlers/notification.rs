//! Handlers for the `/notifications` resource, plus [`notify`], which the
//! task workflow handlers call after a change commits.
//!
//! Every endpoint acts on the caller's own notifications.

use axum::extract::{Path, State};
use axum::Json;
use becs_core::notification::NotificationText;
use becs_core::types::DbId;
use becs_db::models::notification::{CreateNotification, Notification};
use becs_db::repositories::NotificationRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::QueryParams;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationListParams {
    /// Only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<NotificationListParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.unread_only.unwrap_or(false),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(ok(notifications))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(ok(UnreadCount { count }))
}

/// POST /api/notifications/{id}/read
///
/// Another user's notification is reported as missing.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let notification = NotificationRepo::mark_read(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("Notification", id))?;
    Ok(ok(notification))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(ok(MarkedRead { marked_read }))
}

/// A notification waiting to be written.
pub(crate) fn draft(user_id: DbId, task_id: DbId, text: NotificationText) -> CreateNotification {
    CreateNotification {
        user_id,
        kind: text.kind,
        title: text.title,
        message: text.message,
        task_id: Some(task_id),
    }
}

/// Write notifications for a change that has already committed.
///
/// A failure here is logged and swallowed: the change itself stands.
pub(crate) async fn notify(state: &AppState, drafts: Vec<CreateNotification>) {
    if drafts.is_empty() {
        return;
    }
    match NotificationRepo::create_many(&state.pool, &drafts).await {
        Ok(count) => tracing::debug!(count, "Notifications created"),
        Err(e) => tracing::warn!(error = %e, count = drafts.len(), "Failed to create notifications"),
    }
}
