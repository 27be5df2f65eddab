//! Leave template model: canned reasons that pre-fill a leave application.

use becs_core::leave::LeaveType;
use becs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaveTemplate {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub leave_type: LeaveType,
    pub template_content: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateLeaveTemplate {
    pub name: String,
    pub leave_type: LeaveType,
    pub template_content: String,
    pub created_by: DbId,
}
