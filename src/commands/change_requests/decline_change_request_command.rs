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
    models::ChangeRequestStatus,
    services::order_status::{transition, StatusEvent},
    store::SnapshotStore,
};

/// Reviewer rejection of a pending change request. The requested diff
/// is discarded, but the product is still released back into the
/// pipeline — declining only lifts the hold.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DeclineChangeRequestCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub request_id: Uuid,
    #[validate(length(min = 1))]
    pub remarks: String,
}

impl Command for DeclineChangeRequestCommand {
    type Result = ();

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, product_id = %self.product_id, request_id = %self.request_id))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let mut snapshot = store.load()?;
        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        let product = product_mut(order, self.product_id)?;
        let request = product
            .change_requests
            .iter_mut()
            .find(|r| r.id == self.request_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Change request {} not found", self.request_id))
            })?;

        if request.is_processed() {
            return Err(ServiceError::InvariantViolation(format!(
                "change request {} was already {}",
                self.request_id, request.status
            )));
        }
        request.status = ChangeRequestStatus::Declined;
        request.remarks = Some(self.remarks.clone());
        request.processed_at = Some(Utc::now());

        let old_status = product.order_status;
        product.order_status = transition(old_status, StatusEvent::ChangeRequestResolved)?;
        let new_status = product.order_status;
        let now = Utc::now();
        product.updated_at = now;
        order.updated_at = now;

        store.persist(&snapshot)?;
        for event in [
            Event::ChangeRequestDeclined {
                order_id: self.order_id,
                product_id: self.product_id,
                request_id: self.request_id,
            },
            Event::ProductStatusChanged {
                order_id: self.order_id,
                product_id: self.product_id,
                old_status,
                new_status,
            },
        ] {
            event_sender
                .send(event)
                .map_err(ServiceError::EventError)?;
        }
        info!("change request declined");
        Ok(())
    }
}
