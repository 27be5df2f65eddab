//! Handlers for the `/invoices` resource.
//!
//! Any signed-in user may read; admins and directors create, edit and delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use becs_core::invoice::{validate_amount_cents, validate_invoice_number, InvoiceStatus};
use becs_core::types::{Date, DbId};
use becs_db::models::invoice::{
    CreateInvoice, Invoice, InvoiceFilter, InvoiceStatusTotal, UpdateInvoice,
};
use becs_db::repositories::{InvoiceRepo, ProjectRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePrivileged;
use crate::response::{created, ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListParams {
    pub project_id: Option<DbId>,
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub project_id: DbId,
    pub invoice_number: String,
    pub amount_cents: i64,
    pub due_date: Date,
    pub status: Option<InvoiceStatus>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    pub invoice_number: Option<String>,
    pub amount_cents: Option<i64>,
    pub due_date: Option<Date>,
    pub status: Option<InvoiceStatus>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

/// GET /api/invoices
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<InvoiceListParams>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let filter = InvoiceFilter {
        project_id: params.project_id,
        status: params.status,
    };
    let invoices = InvoiceRepo::list(&state.pool, &filter).await?;
    Ok(ok(invoices))
}

/// POST /api/invoices
pub async fn create(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    ValidJson(input): ValidJson<CreateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Invoice>>)> {
    validate_invoice_number(&input.invoice_number)?;
    validate_amount_cents(input.amount_cents)?;
    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or_else(|| {
            AppError::validation(format!("Project {} does not exist", input.project_id))
        })?;

    let create = CreateInvoice {
        project_id: input.project_id,
        invoice_number: input.invoice_number.trim().to_string(),
        amount_cents: input.amount_cents,
        due_date: input.due_date,
        status: input.status.unwrap_or(InvoiceStatus::Unpaid),
        notes: input.notes,
    };
    let invoice = InvoiceRepo::create(&state.pool, &create).await?;
    tracing::info!(
        invoice_id = invoice.id,
        invoice_number = %invoice.invoice_number,
        created_by = auth.user_id,
        "Invoice created"
    );
    Ok(created(invoice))
}

/// GET /api/invoices/summary
///
/// Count and amount per status; every status is listed, zero if unused.
pub async fn summary(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<InvoiceStatusTotal>>>> {
    let totals = InvoiceRepo::totals_by_status(&state.pool).await?;
    Ok(ok(fill_statuses(totals)))
}

fn fill_statuses(totals: Vec<InvoiceStatusTotal>) -> Vec<InvoiceStatusTotal> {
    InvoiceStatus::ALL
        .iter()
        .map(|status| {
            totals
                .iter()
                .find(|t| t.status == status.as_str())
                .cloned()
                .unwrap_or_else(|| InvoiceStatusTotal {
                    status: status.as_str().to_string(),
                    count: 0,
                    amount_cents: 0,
                })
        })
        .collect()
}

/// GET /api/invoices/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let invoice = InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Invoice", id))?;
    Ok(ok(invoice))
}

/// PUT /api/invoices/{id}
pub async fn update(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateInvoiceRequest>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    if let Some(number) = &input.invoice_number {
        validate_invoice_number(number)?;
    }
    if let Some(amount) = input.amount_cents {
        validate_amount_cents(amount)?;
    }
    let update = UpdateInvoice {
        invoice_number: input.invoice_number.map(|n| n.trim().to_string()),
        amount_cents: input.amount_cents,
        due_date: input.due_date,
        status: input.status,
        notes: input.notes,
    };
    let invoice = InvoiceRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::not_found("Invoice", id))?;
    tracing::info!(invoice_id = id, status = %invoice.status, updated_by = auth.user_id, "Invoice updated");
    Ok(ok(invoice))
}

/// DELETE /api/invoices/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequirePrivileged(auth): RequirePrivileged,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if InvoiceRepo::delete(&state.pool, id).await? {
        tracing::info!(invoice_id = id, deleted_by = auth.user_id, "Invoice deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Invoice", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_every_status() {
        let totals = vec![InvoiceStatusTotal {
            status: "unpaid".into(),
            count: 2,
            amount_cents: 150_000,
        }];
        let filled = fill_statuses(totals);
        let statuses: Vec<&str> = filled.iter().map(|t| t.status.as_str()).collect();
        assert_eq!(statuses, ["paid", "unpaid", "overdue"]);
        assert_eq!(filled[1].amount_cents, 150_000);
        assert_eq!(filled[0].count, 0);
    }
}
