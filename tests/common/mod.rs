#![allow(dead_code)]

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use rust_decimal_macros::dec;
use uuid::Uuid;

use imltrack::collaborators::{
    AttachmentRef, DocumentStore, FileUpload, NavTarget, Navigator, Prompter,
};
use imltrack::config::AppConfig;
use imltrack::errors::ServiceError;
use imltrack::events::Event;
use imltrack::models::{
    ContactInfo, ImlType, Order, OrderEstimate, PaymentRecord, PaymentType, Product,
};
use imltrack::store::{InMemoryStore, Snapshot};
use imltrack::AppState;

/// Records every navigation handoff so tests can assert on it.
#[derive(Default)]
pub struct RecordingNavigator {
    pub calls: Mutex<Vec<(String, NavTarget)>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, target: NavTarget) {
        self.calls
            .lock()
            .expect("navigator call log")
            .push((path.to_string(), target));
    }
}

/// Maps every upload to a deterministic attachment reference.
pub struct FakeDocumentStore;

impl DocumentStore for FakeDocumentStore {
    fn attach(&self, file: FileUpload) -> Result<AttachmentRef, ServiceError> {
        Ok(AttachmentRef {
            id: format!("doc-{}", file.name),
            display_name: file.name,
        })
    }
}

/// Answers confirmations and prompts with pre-scripted values.
pub struct ScriptedPrompter {
    pub confirm_answer: bool,
    pub prompt_answer: Option<String>,
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _message: &str) -> bool {
        self.confirm_answer
    }

    fn prompt(&self, _message: &str) -> Option<String> {
        self.prompt_answer.clone()
    }
}

/// Engine wired against the in-memory store with recording fakes for
/// every collaborator.
pub struct TestApp {
    pub state: AppState,
    pub events: Receiver<Event>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_prompter(ScriptedPrompter {
            confirm_answer: true,
            prompt_answer: Some("INV-1".to_string()),
        })
    }

    pub fn with_prompter(prompter: ScriptedPrompter) -> Self {
        let config = AppConfig::new("unused.json", "test");
        imltrack::logging::init(&config);
        let navigator = Arc::new(RecordingNavigator::default());
        let state = AppState::new(
            config,
            Arc::new(InMemoryStore::new()),
            navigator.clone(),
            Arc::new(FakeDocumentStore),
            Arc::new(prompter),
        );
        let events = state.event_sender.subscribe();
        Self {
            state,
            events,
            navigator,
        }
    }

    pub fn seed(&self, snapshot: Snapshot) {
        self.state.store.persist(&snapshot).expect("seed snapshot");
    }

    /// Seeds a single order and returns its id.
    pub fn seed_order(&self, order: Order) -> Uuid {
        let order_id = order.id;
        let mut snapshot = self.snapshot();
        snapshot.orders.push(order);
        self.seed(snapshot);
        order_id
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.store.load().expect("load snapshot")
    }

    pub fn order(&self, order_id: Uuid) -> Order {
        self.snapshot()
            .orders
            .into_iter()
            .find(|o| o.id == order_id)
            .expect("order in snapshot")
    }

    pub fn drain_events(&self) -> Vec<Event> {
        self.events.try_iter().collect()
    }
}

/// A LID-only product with the given ordered/produced quantities.
pub fn lid_product(label_qty: i64, production_qty: i64) -> Product {
    let mut product = Product::new("Round Lid", "1L", "IML-100", ImlType::Lid);
    product.lid_label_qty = label_qty;
    product.lid_production_qty = production_qty;
    product
}

pub fn order_with_products(products: Vec<Product>) -> Order {
    let mut order = Order::new(
        "ORD-1001",
        ContactInfo {
            company: "Acme Packaging".into(),
            contact_name: "R. Mehta".into(),
            phone: Some("98200 00000".into()),
            priority: Some("high".into()),
        },
    );
    order.order_estimate = OrderEstimate {
        estimated_number: "EST-001".into(),
        estimated_value: dec!(40000),
    };
    order.products = products;
    order
}

pub fn advance_payment(amount: rust_decimal::Decimal) -> PaymentRecord {
    PaymentRecord {
        recorded_at: chrono::Utc::now(),
        payment_type: PaymentType::Advance,
        method: "bank transfer".into(),
        amount,
        remarks: None,
        document: None,
    }
}
