use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::{order_mut, product_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{DesignStatus, ProductStatus},
    services::order_status::{transition, StatusEvent},
    store::SnapshotStore,
};

/// Marks a product's artwork approved — either by explicit sign-off or
/// by selecting an existing design. Advances Artwork Pending to Artwork
/// Approved unless the design went out for approval by mail, in which
/// case the status waits for that loop to close.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveDesignCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
}

impl Command for ApproveDesignCommand {
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

        if product.design_status == DesignStatus::Approved {
            return Err(ServiceError::InvalidOperation(
                "design is already approved".into(),
            ));
        }
        product.design_status = DesignStatus::Approved;

        let mut events = vec![Event::DesignApproved {
            order_id: self.order_id,
            product_id: self.product_id,
        }];
        if !product.design_shared_mail && product.order_status == ProductStatus::ArtworkPending
        {
            let old_status = product.order_status;
            product.order_status = transition(old_status, StatusEvent::DesignApproved)?;
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

        store.persist(&snapshot)?;
        for event in events {
            event_sender
                .send(event)
                .map_err(ServiceError::EventError)?;
        }
        info!("design approved");
        Ok(())
    }
}
