use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::{order_mut, product_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        validate_draft, validate_revised_estimate, OrderEstimate, ProductDraft, ProductPatch,
        ProductStatus,
    },
    services::order_status::{transition, StatusEvent},
    store::SnapshotStore,
};

/// Edit-mode save: the pre-purchase path of the change pipeline.
///
/// Applies the diff between the edited draft and the live product
/// directly — no review step, no ChangeRequest record — and writes the
/// revised order estimate. A product that was re-opened from Artwork
/// Approved gets its approval restored.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyProductEditCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub edited: ProductDraft,
    pub revised_estimate: OrderEstimate,
}

impl Command for ApplyProductEditCommand {
    type Result = ProductPatch;

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, product_id = %self.product_id))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        validate_revised_estimate(&self.revised_estimate)?;
        validate_draft(&self.edited)?;

        let mut snapshot = store.load()?;
        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        let product = product_mut(order, self.product_id)?;

        let original = ProductDraft::from(&*product);
        let patch = ProductPatch::between(&original, &self.edited);
        patch.apply_to(product);

        let mut events = vec![Event::ProductUpdated {
            order_id: self.order_id,
            product_id: self.product_id,
        }];
        if product.was_artwork_approved && product.order_status == ProductStatus::OrderPending {
            let old_status = product.order_status;
            product.order_status = transition(old_status, StatusEvent::EditSaved)?;
            product.was_artwork_approved = false;
            events.push(Event::ProductStatusChanged {
                order_id: self.order_id,
                product_id: self.product_id,
                old_status,
                new_status: product.order_status,
            });
        }
        let now = Utc::now();
        product.updated_at = now;

        order.order_estimate = self.revised_estimate.clone();
        order.updated_at = now;
        events.push(Event::OrderUpdated(self.order_id));

        store.persist(&snapshot)?;
        for event in events {
            event_sender
                .send(event)
                .map_err(ServiceError::EventError)?;
        }
        info!(changed_fields = ?patch, "edit applied directly");
        Ok(patch)
    }
}
