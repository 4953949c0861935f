use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::collaborators::{NavTarget, Navigator};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{Order, Person, Product};
use crate::services::reconciliation;
use crate::store::SnapshotStore;

/// Query surface over the order list, plus the purchase-movement
/// handoff. Orders flagged `order_confirm_delete` are invisible to
/// every method here; orders pending admin deletion review show up only
/// in `delete_requests`.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn SnapshotStore>,
    event_sender: EventSender,
    navigator: Arc<dyn Navigator>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        event_sender: EventSender,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            event_sender,
            navigator,
        }
    }

    /// Orders visible in the active views.
    #[instrument(skip(self))]
    pub fn active_orders(&self) -> Result<Vec<Order>, ServiceError> {
        let snapshot = self.store.load()?;
        Ok(snapshot
            .orders
            .into_iter()
            .filter(|o| !o.order_confirm_delete && !o.product_deleted)
            .collect())
    }

    /// Orders parked in the delete-request queue awaiting admin review.
    #[instrument(skip(self))]
    pub fn delete_requests(&self) -> Result<Vec<Order>, ServiceError> {
        let snapshot = self.store.load()?;
        Ok(snapshot
            .orders
            .into_iter()
            .filter(|o| o.product_deleted && !o.order_confirm_delete)
            .collect())
    }

    #[instrument(skip(self))]
    pub fn get_order(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        let snapshot = self.store.load()?;
        snapshot
            .orders
            .into_iter()
            .find(|o| o.id == order_id && !o.order_confirm_delete)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    #[instrument(skip(self))]
    pub fn get_product(
        &self,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<Product, ServiceError> {
        let order = self.get_order(order_id)?;
        order
            .product(product_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Products across all active orders that still have labels to
    /// produce or allocate. Drives the production-planning list.
    #[instrument(skip(self))]
    pub fn products_with_remaining_work(
        &self,
    ) -> Result<Vec<(Uuid, Product)>, ServiceError> {
        let orders = self.active_orders()?;
        let mut out = Vec::new();
        for order in orders {
            let order_id = order.id;
            for product in order.products {
                if !product.product_deleted && reconciliation::remaining_labels(&product) > 0 {
                    out.push((order_id, product));
                }
            }
        }
        Ok(out)
    }

    /// Flags every product of the order for purchase and hands the user
    /// off to the purchase view. Requires all artwork approved.
    #[instrument(skip(self))]
    pub fn move_to_purchase(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let mut snapshot = self.store.load()?;
        let order = snapshot
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && !o.order_confirm_delete && !o.product_deleted)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !order.all_designs_approved() {
            return Err(ServiceError::ValidationError(
                "every product needs approved artwork before moving to purchase".into(),
            ));
        }

        for product in order
            .products
            .iter_mut()
            .filter(|p| !p.product_deleted)
        {
            product.move_to_purchase = true;
        }
        order.updated_at = chrono::Utc::now();

        self.store.persist(&snapshot)?;
        self.event_sender
            .send(Event::MovedToPurchase(order_id))
            .map_err(ServiceError::EventError)?;
        info!(%order_id, "order moved to purchase");

        self.navigator.navigate(
            "/purchase",
            NavTarget {
                order_id,
                product_id: None,
                mode: None,
            },
        );
        Ok(())
    }

    /// The person directory side-table; feeds the external order form.
    #[instrument(skip(self))]
    pub fn people(&self) -> Result<Vec<Person>, ServiceError> {
        Ok(self.store.load()?.people)
    }

    #[instrument(skip(self, person))]
    pub fn add_person(&self, person: Person) -> Result<(), ServiceError> {
        if person.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "person name must not be empty".into(),
            ));
        }
        let mut snapshot = self.store.load()?;
        snapshot.people.push(person);
        self.store.persist(&snapshot)?;
        Ok(())
    }
}
