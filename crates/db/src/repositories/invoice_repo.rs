//! Repository for the `invoices` table.

use becs_core::types::DbId;
use sqlx::PgPool;

use crate::models::invoice::{
    CreateInvoice, Invoice, InvoiceFilter, InvoiceStatusTotal, UpdateInvoice,
};

const COLUMNS: &str = "id, project_id, invoice_number, amount_cents, due_date, status, notes, \
                       created_at, updated_at";

pub struct InvoiceRepo;

impl InvoiceRepo {
    pub async fn create(pool: &PgPool, input: &CreateInvoice) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices (project_id, invoice_number, amount_cents, due_date, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(input.project_id)
            .bind(&input.invoice_number)
            .bind(input.amount_cents)
            .bind(input.due_date)
            .bind(input.status.as_str())
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Invoices matching the filter, earliest due first.
    pub async fn list(pool: &PgPool, filter: &InvoiceFilter) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices
             WHERE ($1::BIGINT IS NULL OR project_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY due_date ASC, id ASC"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(filter.project_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInvoice,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET
                invoice_number = COALESCE($2, invoice_number),
                amount_cents = COALESCE($3, amount_cents),
                due_date = COALESCE($4, due_date),
                status = COALESCE($5, status),
                notes = COALESCE($6, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(&input.invoice_number)
            .bind(input.amount_cents)
            .bind(input.due_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an invoice. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count and summed amount per status. Statuses with no invoices are omitted.
    pub async fn totals_by_status(pool: &PgPool) -> Result<Vec<InvoiceStatusTotal>, sqlx::Error> {
        sqlx::query_as::<_, InvoiceStatusTotal>(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(amount_cents), 0)::BIGINT AS amount_cents
             FROM invoices GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}
