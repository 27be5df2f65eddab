//! Invoice entity model and DTOs.

use becs_core::invoice::InvoiceStatus;
use becs_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub project_id: DbId,
    pub invoice_number: String,
    pub amount_cents: i64,
    pub due_date: Date,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub project_id: DbId,
    pub invoice_number: String,
    pub amount_cents: i64,
    pub due_date: Date,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub invoice_number: Option<String>,
    pub amount_cents: Option<i64>,
    pub due_date: Option<Date>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceFilter {
    pub project_id: Option<DbId>,
    pub status: Option<InvoiceStatus>,
}

/// Count and total per status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceStatusTotal {
    pub status: String,
    pub count: i64,
    pub amount_cents: i64,
}
