use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum InvoiceStatus {
    /// Produced automatically when a delete-type change request is
    /// accepted; awaits an invoice number from accounting.
    #[strum(serialize = "Draft")]
    Draft,
    /// Carries a user-supplied invoice number.
    #[strum(serialize = "Generated")]
    Generated,
}

/// Audit invoice appended to an order when a product (or the order) is
/// removed. Ids are always engine-assigned; invoice numbers come from
/// the accounting side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub size: String,
    pub invoice_no: Option<String>,
    pub invoice_date: DateTime<Utc>,
    pub amount: Decimal,
    pub reason: String,
    #[serde(default)]
    pub remarks: Option<String>,
    pub status: InvoiceStatus,
}
