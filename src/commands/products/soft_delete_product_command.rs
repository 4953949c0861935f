use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    commands::{order_mut, product_mut, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    services::invoicing,
    store::SnapshotStore,
};

/// Product-granularity mirror of the admin delete flow: flags the
/// product deleted and, when accounting supplies an invoice number,
/// appends a Generated invoice for it.
#[derive(Debug, Serialize, Deserialize)]
pub struct SoftDeleteProductCommand {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub invoice_number: Option<String>,
    pub invoice_amount: Option<Decimal>,
    pub remarks: Option<String>,
}

impl Command for SoftDeleteProductCommand {
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

        if product.product_deleted {
            return Err(ServiceError::InvalidOperation(
                "product is already deleted".into(),
            ));
        }
        product.product_deleted = true;
        let now = Utc::now();
        product.updated_at = now;

        let invoice = match &self.invoice_number {
            Some(number) => Some(invoicing::generated_for_product(
                product,
                number,
                self.invoice_amount.unwrap_or(Decimal::ZERO),
                self.remarks.clone(),
            )?),
            None => None,
        };

        let mut events = vec![Event::ProductUpdated {
            order_id: self.order_id,
            product_id: self.product_id,
        }];
        if let Some(invoice) = invoice {
            events.push(Event::InvoiceCreated {
                order_id: self.order_id,
                invoice_id: invoice.id,
            });
            order.invoices.push(invoice);
        }
        order.updated_at = now;

        store.persist(&snapshot)?;
        for event in events {
            event_sender
                .send(event)
                .map_err(ServiceError::EventError)?;
        }
        warn!(invoiced = self.invoice_number.is_some(), "product soft-deleted");
        Ok(())
    }
}
