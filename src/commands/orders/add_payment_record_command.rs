use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    collaborators::AttachmentRef,
    commands::{order_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{PaymentRecord, PaymentType},
    store::SnapshotStore,
};

/// Records a payment against an order: an advance with a positive
/// amount, or a purchase-order commitment carried at zero. The payment
/// evidence arrives pre-attached from the upload collaborator.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddPaymentRecordCommand {
    pub order_id: Uuid,
    pub payment_type: PaymentType,
    #[validate(length(min = 1))]
    pub method: String,
    pub amount: Decimal,
    pub remarks: Option<String>,
    pub document: Option<AttachmentRef>,
}

impl Command for AddPaymentRecordCommand {
    type Result = ();

    #[instrument(skip(self, store, event_sender), fields(order_id = %self.order_id, payment_type = %self.payment_type))]
    fn execute(
        &self,
        store: Arc<dyn SnapshotStore>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        match self.payment_type {
            PaymentType::Advance if self.amount <= Decimal::ZERO => {
                return Err(ServiceError::ValidationError(
                    "an advance payment needs a positive amount".into(),
                ));
            }
            PaymentType::PurchaseOrder if self.amount != Decimal::ZERO => {
                return Err(ServiceError::ValidationError(
                    "a purchase-order record is carried at amount 0".into(),
                ));
            }
            _ => {}
        }

        let mut snapshot = store.load()?;
        let order = order_mut(&mut snapshot.orders, self.order_id)?;
        order.payment_records.push(PaymentRecord {
            recorded_at: Utc::now(),
            payment_type: self.payment_type,
            method: self.method.clone(),
            amount: self.amount,
            remarks: self.remarks.clone(),
            document: self.document.clone(),
        });
        order.updated_at = Utc::now();

        store.persist(&snapshot)?;
        event_sender
            .send(Event::PaymentRecorded {
                order_id: self.order_id,
                payment_type: self.payment_type.to_string(),
            })
            .map_err(ServiceError::EventError)?;
        info!(amount = %self.amount, "payment recorded");
        Ok(())
    }
}
