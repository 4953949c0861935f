use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::{order_mut, product_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ledger_key, Allocation, AllocationType, ProductStatus},
    services::order_status::{transition, StatusEvent},
    services::reconciliation,
    store::SnapshotStore,
};

lazy_static! {
    static ref ALLOCATIONS_RECORDED: IntCounter = IntCounter::new(
        "imltrack_allocations_recorded_total",
        "Total number of production allocations recorded"
    )
    .expect("metric can be created");
    static ref ALLOCATION_FAILURES: IntCounter = IntCounter::new(
        "imltrack_allocation_failures_total",
        "Total number of rejected production allocations"
    )
    .expect("metric can be created");
}

/// Sends part of a product's remaining labels to a production run.
///
/// The quantity must fit inside the current net remaining; on success a
/// new ledger entry is appended (never edited later) and the product's
/// denormalized cache is refreshed.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecordAllocationCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordAllocationResult {
    pub allocation: Allocation,
    /// Net remaining immediately after this allocation.
    pub net_remaining: i64,
}

impl Command for RecordAllocationCommand {
    type Result = RecordAllocationResult;

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, product_id = %self.product_id, quantity = self.quantity))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            ALLOCATION_FAILURES.inc();
            ServiceError::from(e)
        })?;

        let mut snapshot = store.load()?;
        let key = ledger_key(self.order_id, self.product_id);
        let history = snapshot
            .production_allocations
            .get(&key)
            .cloned()
            .unwrap_or_default();
        let received = snapshot.labels_received.get(&key).copied();

        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        let product = product_mut(order, self.product_id)?;
        if product.product_deleted {
            return Err(ServiceError::InvalidOperation(
                "cannot allocate a deleted product".into(),
            ));
        }

        let available = reconciliation::net_remaining(product, &history);
        if self.quantity > available {
            ALLOCATION_FAILURES.inc();
            error!(
                requested = self.quantity,
                available, "allocation exceeds net remaining"
            );
            return Err(ServiceError::ValidationError(format!(
                "cannot allocate {} labels, only {} remaining",
                self.quantity, available
            )));
        }

        let entry = Allocation {
            id: Uuid::new_v4(),
            order_id: self.order_id,
            product_id: self.product_id,
            recorded_at: Utc::now(),
            current_remaining: available,
            allocated_qty: self.quantity,
            remaining_after: available - self.quantity,
            allocation_type: AllocationType::Production,
        };
        if entry.remaining_after < 0 {
            // Unreachable given the check above; recomputed defence
            // against a drifted cache.
            return Err(ServiceError::InvariantViolation(format!(
                "allocation would leave {} remaining",
                entry.remaining_after
            )));
        }

        product.production_allocations.push(entry.clone());
        product.updated_at = entry.recorded_at;

        let mut events = vec![Event::AllocationRecorded {
            order_id: self.order_id,
            product_id: self.product_id,
            allocated_qty: entry.allocated_qty,
            remaining_after: entry.remaining_after,
        }];

        // Production completes automatically once nothing is left to
        // allocate for any label class.
        let mut full_history = history;
        full_history.push(entry.clone());
        if product.order_status == ProductStatus::InProduction
            && reconciliation::dispatch_ready(product, &full_history, received.as_ref())
        {
            let old_status = product.order_status;
            product.order_status =
                transition(old_status, StatusEvent::ProductionExhausted)?;
            events.push(Event::ProductStatusChanged {
                order_id: self.order_id,
                product_id: self.product_id,
                old_status,
                new_status: product.order_status,
            });
        }
        order.updated_at = entry.recorded_at;

        snapshot
            .production_allocations
            .entry(key)
            .or_default()
            .push(entry.clone());
        store.persist(&snapshot)?;

        for event in events {
            event_sender
                .send(event)
                .map_err(ServiceError::EventError)?;
        }
        ALLOCATIONS_RECORDED.inc();
        info!(
            allocated = entry.allocated_qty,
            remaining_after = entry.remaining_after,
            "production allocation recorded"
        );

        Ok(RecordAllocationResult {
            net_remaining: entry.remaining_after,
            allocation: entry,
        })
    }
}
