//! Invoice records.

use crate::error::CoreError;

crate::define_text_enum! {
    /// Payment state. Set explicitly by privileged users.
    InvoiceStatus("invoice status") {
        Paid = "paid",
        Unpaid = "unpaid",
        Overdue = "overdue",
    }
}

/// Amounts are whole cents and never negative.
pub fn validate_amount_cents(amount_cents: i64) -> Result<(), CoreError> {
    if amount_cents < 0 {
        return Err(CoreError::Validation(format!(
            "Invoice amount must not be negative (got {amount_cents} cents)"
        )));
    }
    Ok(())
}

/// Invoice numbers are non-blank and at most 50 characters.
pub fn validate_invoice_number(number: &str) -> Result<(), CoreError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(CoreError::Validation(
            "Invoice number is required".to_string(),
        ));
    }
    if number.len() > 50 {
        return Err(CoreError::Validation(
            "Invoice number must be at most 50 characters".to_string(),
        ));
    }
    Ok(())
}
