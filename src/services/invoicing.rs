//! Invoice construction for the deletion/refund workflows.
//!
//! Invoices are only ever built here; callers never assemble one by
//! hand, so ids stay engine-assigned and the status matches the path
//! that produced the record.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{Invoice, InvoiceStatus, Product};

// Accounting numbers like "INV/2026/0042" or "DEL-117".
static INVOICE_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9/_-]{0,31}$").expect("invoice number regex"));

pub fn validate_invoice_number(invoice_no: &str) -> Result<(), ServiceError> {
    if INVOICE_NO.is_match(invoice_no.trim()) {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "'{}' is not a valid invoice number",
            invoice_no
        )))
    }
}

/// Draft invoice appended when a delete-type change request is
/// accepted; `amount` is the deleted product's last-known budget.
pub fn deletion_draft(product: &Product, amount: Decimal, remarks: Option<String>) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        product_id: product.id,
        product_name: product.product_name.clone(),
        size: product.size.clone(),
        invoice_no: None,
        invoice_date: Utc::now(),
        amount,
        reason: "product removed via accepted delete request".into(),
        remarks,
        status: InvoiceStatus::Draft,
    }
}

/// Generated invoice keyed by a user-supplied number, appended on a
/// product-level soft delete.
pub fn generated_for_product(
    product: &Product,
    invoice_no: &str,
    amount: Decimal,
    remarks: Option<String>,
) -> Result<Invoice, ServiceError> {
    validate_invoice_number(invoice_no)?;
    Ok(Invoice {
        id: Uuid::new_v4(),
        product_id: product.id,
        product_name: product.product_name.clone(),
        size: product.size.clone(),
        invoice_no: Some(invoice_no.trim().to_string()),
        invoice_date: Utc::now(),
        amount,
        reason: "product soft-deleted".into(),
        remarks,
        status: InvoiceStatus::Generated,
    })
}
