//! Change notification fan-out.
//!
//! After every successful mutation the engine broadcasts an event so
//! other open views (purchase, production detail) re-read the snapshot.
//! Delivery is at-least-once with no ordering guarantee beyond "the
//! write happened before the broadcast"; subscribers treat any event as
//! a cue to reload and may ignore the payload entirely.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{ChangeRequestType, ProductStatus};

/// Events emitted by the workflow engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    OrderUpdated(Uuid),
    OrderRemoved(Uuid),
    OrderDeleteRequested(Uuid),
    OrderDeletionConfirmed(Uuid),
    OrderDeleteRejected(Uuid),
    MovedToPurchase(Uuid),
    PaymentRecorded {
        order_id: Uuid,
        payment_type: String,
    },
    ProductUpdated {
        order_id: Uuid,
        product_id: Uuid,
    },
    ProductStatusChanged {
        order_id: Uuid,
        product_id: Uuid,
        old_status: ProductStatus,
        new_status: ProductStatus,
    },
    DesignApproved {
        order_id: Uuid,
        product_id: Uuid,
    },
    AllocationRecorded {
        order_id: Uuid,
        product_id: Uuid,
        allocated_qty: i64,
        remaining_after: i64,
    },
    LabelsReceivedUpdated {
        order_id: Uuid,
        product_id: Uuid,
    },
    ChangeRequestSubmitted {
        order_id: Uuid,
        product_id: Uuid,
        request_id: Uuid,
        request_type: ChangeRequestType,
    },
    ChangeRequestAccepted {
        order_id: Uuid,
        product_id: Uuid,
        request_id: Uuid,
    },
    ChangeRequestDeclined {
        order_id: Uuid,
        product_id: Uuid,
        request_id: Uuid,
    },
    InvoiceCreated {
        order_id: Uuid,
        invoice_id: Uuid,
    },
}

/// Fan-out sender handed to every workflow component. Subscribing
/// returns a plain `mpsc` receiver; closed subscribers are dropped on
/// the next send.
#[derive(Clone, Default)]
pub struct EventSender {
    subscribers: Arc<Mutex<Vec<Sender<Event>>>>,
}

impl EventSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = channel();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.push(tx);
        rx
    }

    /// Broadcasts an event to every live subscriber.
    pub fn send(&self, event: Event) -> Result<(), String> {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        Ok(())
    }
}

/// Drains a subscriber channel, logging each event. Embedders that do
/// not react to individual events can park a thread here for the audit
/// trail alone.
pub fn process_events(rx: Receiver<Event>) {
    info!("starting event processing loop");
    while let Ok(event) = rx.recv() {
        match &event {
            Event::ProductStatusChanged {
                order_id,
                product_id,
                old_status,
                new_status,
            } => {
                info!(
                    %order_id, %product_id,
                    "product status changed from '{}' to '{}'",
                    old_status, new_status
                );
            }
            Event::AllocationRecorded {
                order_id,
                product_id,
                allocated_qty,
                remaining_after,
            } => {
                info!(
                    %order_id, %product_id, allocated_qty, remaining_after,
                    "production allocation recorded"
                );
            }
            Event::OrderDeleteRequested(order_id) => {
                warn!(%order_id, "order flagged for deletion, pending admin review");
            }
            Event::OrderDeletionConfirmed(order_id) => {
                warn!(%order_id, "order deletion confirmed by admin");
            }
            other => {
                info!("event: {:?}", other);
            }
        }
    }
    info!("event processing loop ended");
}
