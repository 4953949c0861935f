//! Mutating operations, one command per file.
//!
//! Each command is a validated input struct whose `execute` runs the
//! whole read-modify-write-then-broadcast cycle to completion before
//! returning. Validation failures happen before anything is written;
//! there are no partial writes and nothing is retried.

pub mod allocations;
pub mod change_requests;
pub mod orders;
pub mod products;

use std::sync::Arc;

use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::models::{Order, Product};
use crate::store::SnapshotStore;

pub trait Command {
    type Result;

    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

/// Looks up a live order for mutation. Confirm-deleted orders are
/// invisible here like everywhere else.
pub(crate) fn order_mut(
    orders: &mut [Order],
    order_id: Uuid,
) -> Result<&mut Order, ServiceError> {
    orders
        .iter_mut()
        .find(|o| o.id == order_id && !o.order_confirm_delete)
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
}

pub(crate) fn product_mut(
    order: &mut Order,
    product_id: Uuid,
) -> Result<&mut Product, ServiceError> {
    let order_id = order.id;
    order.product_mut(product_id).ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Product {} not found on order {}",
            product_id, order_id
        ))
    })
}
