use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    commands::{order_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ChangeRequestStatus, ChangeRequestType},
    services::invoicing,
    services::order_status::{transition, StatusEvent},
    store::SnapshotStore,
};

lazy_static! {
    static ref CHANGE_REQUESTS_ACCEPTED: IntCounter = IntCounter::new(
        "imltrack_change_requests_accepted_total",
        "Total number of change requests accepted"
    )
    .expect("metric can be created");
}

/// Reviewer acceptance of a pending change request.
///
/// A delete request removes the product, re-points the order estimate
/// at the revision, and leaves a Draft invoice for the removed budget.
/// A change request applies the stored diff and releases the product
/// back into the pipeline. Either way the request's status is written
/// exactly once.
#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptChangeRequestCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub request_id: Uuid,
    pub remarks: Option<String>,
}

impl Command for AcceptChangeRequestCommand {
    type Result = ();

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, product_id = %self.product_id, request_id = %self.request_id))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let mut snapshot = store.load()?;
        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        let product_pos = order
            .products
            .iter()
            .position(|p| p.id == self.product_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", self.product_id))
            })?;
        let request_pos = order.products[product_pos]
            .change_requests
            .iter()
            .position(|r| r.id == self.request_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Change request {} not found", self.request_id))
            })?;

        let request = &order.products[product_pos].change_requests[request_pos];
        if request.is_processed() {
            return Err(ServiceError::InvariantViolation(format!(
                "change request {} was already {}",
                self.request_id, request.status
            )));
        }
        let request_type = request.request_type;
        let revised_estimate = request.revised_estimate.clone();
        let requested_changes = request.requested_changes.clone();

        let mut events = vec![Event::ChangeRequestAccepted {
            order_id: self.order_id,
            product_id: self.product_id,
            request_id: self.request_id,
        }];

        match request_type {
            ChangeRequestType::Delete => {
                let removed_budget = (order.order_estimate.estimated_value
                    - revised_estimate.estimated_value)
                    .max(Decimal::ZERO);
                let product = order.products.remove(product_pos);
                let invoice =
                    invoicing::deletion_draft(&product, removed_budget, self.remarks.clone());
                events.push(Event::InvoiceCreated {
                    order_id: self.order_id,
                    invoice_id: invoice.id,
                });
                order.invoices.push(invoice);
                order.order_estimate = revised_estimate;
                warn!(product_id = %self.product_id, "product removed via accepted delete request");
            }
            ChangeRequestType::Change => {
                let product = &mut order.products[product_pos];
                requested_changes.apply_to(product);
                let old_status = product.order_status;
                product.order_status =
                    transition(old_status, StatusEvent::ChangeRequestResolved)?;
                let new_status = product.order_status;
                let request = &mut product.change_requests[request_pos];
                request.status = ChangeRequestStatus::Accepted;
                request.remarks = self.remarks.clone();
                request.processed_at = Some(Utc::now());
                product.updated_at = Utc::now();
                events.push(Event::ProductStatusChanged {
                    order_id: self.order_id,
                    product_id: self.product_id,
                    old_status,
                    new_status,
                });
                order.order_estimate = revised_estimate;
            }
        }
        order.updated_at = Utc::now();
        events.push(Event::OrderUpdated(self.order_id));

        store.persist(&snapshot)?;
        for event in events {
            event_sender
                .send(event)
                .map_err(ServiceError::EventError)?;
        }
        CHANGE_REQUESTS_ACCEPTED.inc();
        info!("change request accepted");
        Ok(())
    }
}
