use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::collaborators::{DocumentStore, FileUpload, Prompter};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::RefundInfo;
use crate::services::invoicing;
use crate::store::SnapshotStore;

/// How an order-deletion attempt resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOrderOutcome {
    /// No payments, nothing purchased: the order was removed outright.
    Removed,
    /// Payments exist; refund evidence must be captured before the
    /// order can be flagged. Nothing was written.
    RefundRequired,
    /// Products were moved to purchase; the order is now parked in the
    /// admin delete-request queue.
    PendingAdminReview,
    /// The user declined the confirmation; nothing was written.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminDecision {
    Accept,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminReviewOutcome {
    Confirmed,
    Rejected,
    /// The invoice-number prompt was cancelled; nothing was written.
    Cancelled,
}

/// Order deletion, refund capture, and the admin review that finishes
/// both soft-delete paths. Owns the confirmation/prompt and document
/// collaborators so every mutating step stays behind its gate.
#[derive(Clone)]
pub struct DeletionService {
    store: Arc<dyn SnapshotStore>,
    event_sender: EventSender,
    prompter: Arc<dyn Prompter>,
    documents: Arc<dyn DocumentStore>,
}

impl DeletionService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        event_sender: EventSender,
        prompter: Arc<dyn Prompter>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            store,
            event_sender,
            prompter,
            documents,
        }
    }

    /// Entry point of the deletion workflow. Branches on the two
    /// predicates: payment records and purchase movement.
    #[instrument(skip(self))]
    pub fn delete_order(&self, order_id: Uuid) -> Result<DeleteOrderOutcome, ServiceError> {
        let mut snapshot = self.store.load()?;
        let position = snapshot
            .orders
            .iter()
            .position(|o| o.id == order_id && !o.order_confirm_delete)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let order = &snapshot.orders[position];
        if order.has_moved_to_purchase() {
            let order = &mut snapshot.orders[position];
            order.product_deleted = true;
            order.updated_at = Utc::now();
            self.store.persist(&snapshot)?;
            self.event_sender
                .send(Event::OrderDeleteRequested(order_id))
                .map_err(ServiceError::EventError)?;
            warn!(%order_id, "order routed to admin delete review");
            return Ok(DeleteOrderOutcome::PendingAdminReview);
        }

        if order.has_payment_records() {
            // The caller must collect refund evidence first.
            return Ok(DeleteOrderOutcome::RefundRequired);
        }

        let message = format!("Delete order {}?", order.order_number);
        if !self.prompter.confirm(&message) {
            return Ok(DeleteOrderOutcome::Cancelled);
        }

        snapshot.orders.remove(position);
        self.store.persist(&snapshot)?;
        self.event_sender
            .send(Event::OrderRemoved(order_id))
            .map_err(ServiceError::EventError)?;
        info!(%order_id, "order removed");
        Ok(DeleteOrderOutcome::Removed)
    }

    /// Refund-evidence capture for orders with payments. Remarks and a
    /// document are both mandatory; only then is the order flagged for
    /// admin review with its refund record attached.
    #[instrument(skip(self, evidence))]
    pub fn capture_refund(
        &self,
        order_id: Uuid,
        remarks: &str,
        evidence: Option<FileUpload>,
    ) -> Result<(), ServiceError> {
        if remarks.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "refund remarks must not be empty".into(),
            ));
        }
        let evidence = evidence.ok_or_else(|| {
            ServiceError::ValidationError("a refund document is required".into())
        })?;

        let mut snapshot = self.store.load()?;
        let order = snapshot
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && !o.order_confirm_delete)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        if !order.has_payment_records() {
            return Err(ServiceError::InvalidOperation(
                "refund capture only applies to orders with payments".into(),
            ));
        }

        let document = self.documents.attach(evidence)?;
        order.product_deleted = true;
        order.refund_info = Some(RefundInfo {
            remarks: remarks.trim().to_string(),
            document,
            captured_at: Utc::now(),
        });
        order.updated_at = Utc::now();

        self.store.persist(&snapshot)?;
        self.event_sender
            .send(Event::OrderDeleteRequested(order_id))
            .map_err(ServiceError::EventError)?;
        warn!(%order_id, "order flagged for deletion with refund evidence");
        Ok(())
    }

    /// Admin review of a parked delete request. Accept asks for the
    /// deletion invoice number and confirms; reject returns the order
    /// to the active list.
    #[instrument(skip(self))]
    pub fn admin_review(
        &self,
        order_id: Uuid,
        decision: AdminDecision,
    ) -> Result<AdminReviewOutcome, ServiceError> {
        let mut snapshot = self.store.load()?;
        let order = snapshot
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && !o.order_confirm_delete)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        if !order.product_deleted {
            return Err(ServiceError::InvalidOperation(
                "order has no pending delete request".into(),
            ));
        }

        match decision {
            AdminDecision::Accept => {
                let Some(invoice_no) = self.prompter.prompt("Deletion invoice number") else {
                    return Ok(AdminReviewOutcome::Cancelled);
                };
                invoicing::validate_invoice_number(&invoice_no)?;
                order.order_confirm_delete = true;
                order.deletion_invoice_number = Some(invoice_no.trim().to_string());
                order.updated_at = Utc::now();
                self.store.persist(&snapshot)?;
                self.event_sender
                    .send(Event::OrderDeletionConfirmed(order_id))
                    .map_err(ServiceError::EventError)?;
                warn!(%order_id, "order deletion confirmed");
                Ok(AdminReviewOutcome::Confirmed)
            }
            AdminDecision::Reject => {
                order.product_deleted = false;
                order.updated_at = Utc::now();
                self.store.persist(&snapshot)?;
                self.event_sender
                    .send(Event::OrderDeleteRejected(order_id))
                    .map_err(ServiceError::EventError)?;
                info!(%order_id, "order delete request rejected");
                Ok(AdminReviewOutcome::Rejected)
            }
        }
    }
}
