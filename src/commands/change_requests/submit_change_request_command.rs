use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::{order_mut, product_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        validate_draft, validate_revised_estimate, ChangeRequest, ChangeRequestStatus,
        ChangeRequestType, OrderEstimate, ProductDraft, ProductPatch,
    },
    services::order_status::{transition, StatusEvent},
    store::SnapshotStore,
};

lazy_static! {
    static ref CHANGE_REQUESTS_SUBMITTED: IntCounter = IntCounter::new(
        "imltrack_change_requests_submitted_total",
        "Total number of change requests submitted"
    )
    .expect("metric can be created");
}

/// Request-mode save: the post-artwork path of the change pipeline.
///
/// Instead of touching the product, the edit (or deletion) is parked as
/// a ChangeRequest with a sparse diff against the original snapshot and
/// the mandatory revised estimate, and the product waits in CR Approval
/// Pending for a reviewer.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitChangeRequestCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub request_type: ChangeRequestType,
    /// The edited draft. Required for change requests; a delete request
    /// carries the whole product as payload and may omit it.
    pub edited: Option<ProductDraft>,
    pub revised_estimate: OrderEstimate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitChangeRequestResult {
    pub request_id: Uuid,
    pub requested_changes: ProductPatch,
}

impl Command for SubmitChangeRequestCommand {
    type Result = SubmitChangeRequestResult;

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, product_id = %self.product_id, request_type = %self.request_type))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        validate_revised_estimate(&self.revised_estimate)?;

        let mut snapshot = store.load()?;
        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        let product = product_mut(order, self.product_id)?;
        if product.product_deleted {
            return Err(ServiceError::InvalidOperation(
                "product is already deleted".into(),
            ));
        }

        let original = ProductDraft::from(&*product);
        let patch = match self.request_type {
            ChangeRequestType::Change => {
                let edited = self.edited.as_ref().ok_or_else(|| {
                    ServiceError::ValidationError(
                        "a change request needs the edited product".into(),
                    )
                })?;
                validate_draft(edited)?;
                let patch = ProductPatch::between(&original, edited);
                if patch.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "no changes requested".into(),
                    ));
                }
                patch
            }
            // The whole product is the payload; an empty diff is fine.
            ChangeRequestType::Delete => self
                .edited
                .as_ref()
                .map(|edited| ProductPatch::between(&original, edited))
                .unwrap_or_default(),
        };

        let old_status = product.order_status;
        product.order_status = transition(old_status, StatusEvent::ChangeRequestSubmitted)?;

        let request = ChangeRequest {
            id: Uuid::new_v4(),
            request_type: self.request_type,
            submitted_at: Utc::now(),
            original_details: original,
            requested_changes: patch.clone(),
            revised_estimate: self.revised_estimate.clone(),
            status: ChangeRequestStatus::Pending,
            remarks: None,
            processed_at: None,
        };
        let request_id = request.id;
        product.change_requests.push(request);
        product.updated_at = Utc::now();
        let new_status = product.order_status;
        order.updated_at = Utc::now();

        store.persist(&snapshot)?;
        for event in [
            Event::ChangeRequestSubmitted {
                order_id: self.order_id,
                product_id: self.product_id,
                request_id,
                request_type: self.request_type,
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
        CHANGE_REQUESTS_SUBMITTED.inc();
        info!(%request_id, "change request submitted");

        Ok(SubmitChangeRequestResult {
            request_id,
            requested_changes: patch,
        })
    }
}
