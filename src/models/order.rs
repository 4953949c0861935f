use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborators::AttachmentRef;
use crate::models::{DesignStatus, Invoice, Product};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub company: String,
    pub contact_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Free-form priority marker supplied by the sales side.
    #[serde(default)]
    pub priority: Option<String>,
}

/// Quoted estimate for an order: a human-facing estimate number plus the
/// quoted value. Revised on every accepted change or deletion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEstimate {
    pub estimated_number: String,
    pub estimated_value: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum PaymentType {
    /// Advance payment; carries a positive amount.
    #[strum(serialize = "advance")]
    Advance,
    /// Purchase-order commitment; recorded with amount 0.
    #[strum(serialize = "po")]
    PurchaseOrder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub recorded_at: DateTime<Utc>,
    pub payment_type: PaymentType,
    pub method: String,
    pub amount: Decimal,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub document: Option<AttachmentRef>,
}

/// Evidence captured before an order with payments may be flagged for
/// deletion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefundInfo {
    pub remarks: String,
    pub document: AttachmentRef,
    pub captured_at: DateTime<Utc>,
}

/// Entry of the person directory side-table. Feeds the (out-of-scope)
/// order-creation form; the engine only stores and serves it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// A manufacturing order for labelled packaging components.
///
/// Orders are created by the external form and mutated here for the rest
/// of their life. `order_confirm_delete` hides an order from every view;
/// `product_deleted` parks it in the delete-request queue pending admin
/// review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub contact: ContactInfo,
    pub order_estimate: OrderEstimate,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub payment_records: Vec<PaymentRecord>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub product_deleted: bool,
    #[serde(default)]
    pub order_confirm_delete: bool,
    #[serde(default)]
    pub deletion_invoice_number: Option<String>,
    #[serde(default)]
    pub refund_info: Option<RefundInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(order_number: impl Into<String>, contact: ContactInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_number: order_number.into(),
            contact,
            order_estimate: OrderEstimate::default(),
            products: Vec::new(),
            payment_records: Vec::new(),
            invoices: Vec::new(),
            product_deleted: false,
            order_confirm_delete: false,
            deletion_invoice_number: None,
            refund_info: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn product(&self, product_id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn product_mut(&mut self, product_id: Uuid) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == product_id)
    }

    pub fn has_payment_records(&self) -> bool {
        !self.payment_records.is_empty()
    }

    pub fn has_moved_to_purchase(&self) -> bool {
        self.products.iter().any(|p| p.move_to_purchase)
    }

    /// Gate for the purchase-movement action: every live product must
    /// have its artwork approved.
    pub fn all_designs_approved(&self) -> bool {
        let mut any = false;
        for product in self.products.iter().filter(|p| !p.product_deleted) {
            any = true;
            if product.design_status != DesignStatus::Approved {
                return false;
            }
        }
        any
    }
}
