//! Quantity reconciliation calculator.
//!
//! Pure functions only. Remaining quantities are always recomputed from
//! the product fields and the full ledger history — never read from a
//! cached cumulative value — so a replayed or audited ledger reconciles
//! to the same numbers every time.

use crate::models::{Allocation, ImlType, LabelClass, LabelsReceived, Product};

/// Labels still to be produced for one class: `max(0, ordered - produced)`.
pub fn class_remaining(product: &Product, class: LabelClass) -> i64 {
    (product.label_qty(class) - product.production_qty(class)).max(0)
}

/// Labels still to be produced across every class the product's
/// `iml_type` carries. Basis for the "has remaining work" filter and
/// the cap on allocation input.
pub fn remaining_labels(product: &Product) -> i64 {
    product
        .iml_type
        .classes()
        .iter()
        .map(|class| class_remaining(product, *class))
        .sum()
}

/// Sum of everything already sent to production per the ledger.
pub fn total_allocated(history: &[Allocation]) -> i64 {
    history.iter().map(|entry| entry.allocated_qty).sum()
}

/// Remaining labels minus everything already allocated, floored at 0.
pub fn net_remaining(product: &Product, history: &[Allocation]) -> i64 {
    (remaining_labels(product) - total_allocated(history)).max(0)
}

/// True when the labels-received override reported by the production
/// detail view covers the full ordered quantity of every class.
/// Single-class products report through `single`, with the class field
/// accepted as an alias.
pub fn received_covers_order(product: &Product, received: &LabelsReceived) -> bool {
    match product.iml_type {
        ImlType::Lid => received.single.max(received.lid) >= product.lid_label_qty,
        ImlType::Tub => received.single.max(received.tub) >= product.tub_label_qty,
        ImlType::LidAndTub => {
            received.lid >= product.lid_label_qty && received.tub >= product.tub_label_qty
        }
    }
}

/// Whether production of this product is complete: every applicable
/// label class has been fully allocated, or the production floor has
/// reported receiving the full ordered quantity. Evaluated after every
/// allocation and every labels-received override.
pub fn dispatch_ready(
    product: &Product,
    history: &[Allocation],
    received: Option<&LabelsReceived>,
) -> bool {
    if net_remaining(product, history) == 0 {
        return true;
    }
    received.is_some_and(|r| received_covers_order(product, r))
}
