use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::{order_mut, product_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ledger_key, LabelsReceived, ProductStatus},
    services::order_status::{transition, StatusEvent},
    services::reconciliation,
    store::SnapshotStore,
};

/// Records the production-detail view's manual "total labels received"
/// figures for a product. Upserts the override table entry and, like an
/// allocation, re-evaluates whether production is complete.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SetLabelsReceivedCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 0))]
    pub lid: i64,
    #[validate(range(min = 0))]
    pub tub: i64,
    #[validate(range(min = 0))]
    pub single: i64,
}

impl Command for SetLabelsReceivedCommand {
    type Result = LabelsReceived;

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, product_id = %self.product_id))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let mut snapshot = store.load()?;
        let key = ledger_key(self.order_id, self.product_id);
        let history = snapshot
            .production_allocations
            .get(&key)
            .cloned()
            .unwrap_or_default();
        let received = LabelsReceived {
            lid: self.lid,
            tub: self.tub,
            single: self.single,
        };

        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        let product = product_mut(order, self.product_id)?;

        let mut events = vec![Event::LabelsReceivedUpdated {
            order_id: self.order_id,
            product_id: self.product_id,
        }];
        if product.order_status == ProductStatus::InProduction
            && reconciliation::dispatch_ready(product, &history, Some(&received))
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
        let now = Utc::now();
        product.updated_at = now;
        order.updated_at = now;

        snapshot.labels_received.insert(key, received);
        store.persist(&snapshot)?;

        for event in events {
            event_sender
                .send(event)
                .map_err(ServiceError::EventError)?;
        }
        info!(lid = self.lid, tub = self.tub, single = self.single, "labels received recorded");
        Ok(received)
    }
}
