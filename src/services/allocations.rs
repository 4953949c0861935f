use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{ledger_key, Allocation, LabelsReceived};
use crate::services::reconciliation;
use crate::store::SnapshotStore;

/// Read paths over the production allocation ledger. Mutation goes
/// through `commands::allocations`; this service only answers audit and
/// display queries.
#[derive(Clone)]
pub struct AllocationService {
    store: Arc<dyn SnapshotStore>,
}

impl AllocationService {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Ledger entries for one product in insertion order.
    #[instrument(skip(self))]
    pub fn history(
        &self,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<Allocation>, ServiceError> {
        let snapshot = self.store.load()?;
        Ok(snapshot
            .production_allocations
            .get(&ledger_key(order_id, product_id))
            .cloned()
            .unwrap_or_default())
    }

    /// Everything already sent to production for the product.
    #[instrument(skip(self))]
    pub fn total_allocated(
        &self,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<i64, ServiceError> {
        Ok(reconciliation::total_allocated(
            &self.history(order_id, product_id)?,
        ))
    }

    /// Net remaining for the product, recomputed from the full history.
    #[instrument(skip(self))]
    pub fn net_remaining(&self, order_id: Uuid, product_id: Uuid) -> Result<i64, ServiceError> {
        let snapshot = self.store.load()?;
        let order = snapshot
            .orders
            .iter()
            .find(|o| o.id == order_id && !o.order_confirm_delete)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        let product = order.product(product_id).ok_or_else(|| {
            ServiceError::NotFound(format!("Product {} not found", product_id))
        })?;
        let history = snapshot
            .production_allocations
            .get(&ledger_key(order_id, product_id))
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(reconciliation::net_remaining(product, history))
    }

    /// The manual labels-received override recorded by the production
    /// detail view, if any.
    #[instrument(skip(self))]
    pub fn labels_received(
        &self,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<LabelsReceived>, ServiceError> {
        let snapshot = self.store.load()?;
        Ok(snapshot
            .labels_received
            .get(&ledger_key(order_id, product_id))
            .copied())
    }
}
