use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::{order_mut, product_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    services::order_status::{transition, StatusEvent},
    store::SnapshotStore,
};

/// Re-opens an approved product for editing. The previous approval is
/// remembered so an edit-mode save can restore Artwork Approved without
/// routing through change-request review.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReEditProductCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
}

impl Command for ReEditProductCommand {
    type Result = ();

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, product_id = %self.product_id))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let mut snapshot = store.load()?;
        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        let product = product_mut(order, self.product_id)?;

        let old_status = product.order_status;
        product.order_status = transition(old_status, StatusEvent::ReEditRequested)?;
        product.was_artwork_approved = true;
        let now = Utc::now();
        product.updated_at = now;
        let new_status = product.order_status;
        order.updated_at = now;

        store.persist(&snapshot)?;
        event_sender
            .send(Event::ProductStatusChanged {
                order_id: self.order_id,
                product_id: self.product_id,
                old_status,
                new_status,
            })
            .map_err(ServiceError::EventError)?;
        info!("product re-opened for editing");
        Ok(())
    }
}
