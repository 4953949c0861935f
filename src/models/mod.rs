pub mod allocation;
pub mod change_request;
pub mod invoice;
pub mod order;
pub mod product;

pub use allocation::{Allocation, AllocationType, LabelsReceived};
pub use change_request::{
    estimate_prefill, validate_draft, validate_revised_estimate, ChangeRequest,
    ChangeRequestStatus, ChangeRequestType, ProductDraft, ProductPatch,
};
pub use invoice::{Invoice, InvoiceStatus};
pub use order::{
    ContactInfo, Order, OrderEstimate, PaymentRecord, PaymentType, Person, RefundInfo,
};
pub use product::{
    DesignFile, DesignStatus, DesignType, ImlType, LabelClass, Product, ProductStatus,
};

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Key under which one product's allocation ledger and labels-received
/// override live. The ledger outlives any single production run, so the
/// key is owned jointly by the order/product pair.
pub fn ledger_key(order_id: Uuid, product_id: Uuid) -> String {
    format!("{}_{}", order_id, product_id)
}

/// Parse-or-zero deserializer for label quantities.
///
/// Snapshots written by older tooling carry quantities as numbers,
/// numeric strings, or nothing at all; reconciliation treats every
/// unusable value as 0 rather than rejecting the snapshot.
pub(crate) fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(v)) => v,
        Some(Raw::Float(v)) if v.is_finite() => v as i64,
        Some(Raw::Float(_)) => 0,
        Some(Raw::Text(s)) => s.trim().parse::<i64>().unwrap_or(0),
        None => 0,
    })
}
