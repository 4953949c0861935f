//! imltrack — order reconciliation and workflow engine for in-mold
//! label (IML) packaging manufacturing.
//!
//! Tracks manufacturing orders for labelled packaging components from
//! artwork approval through production and dispatch: quantity
//! reconciliation per label class, an append-only production allocation
//! ledger, the per-product status state machine, mid-flight change
//! requests, and the deletion/refund audit trail. A local, single-user
//! state engine; rendering, routing, and file upload are external
//! collaborators behind the traits in [`collaborators`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod collaborators;
pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::collaborators::{DocumentStore, Navigator, Prompter};
use crate::events::EventSender;
use crate::services::{AllocationService, DeletionService, OrderService};
use crate::store::SnapshotStore;

/// Shared state wiring the engine together: one store, one event
/// fan-out, and the workflow services with their collaborators
/// injected.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub store: Arc<dyn SnapshotStore>,
    pub event_sender: Arc<EventSender>,
    pub orders: OrderService,
    pub allocations: AllocationService,
    pub deletion: DeletionService,
}

impl AppState {
    pub fn new(
        config: config::AppConfig,
        store: Arc<dyn SnapshotStore>,
        navigator: Arc<dyn Navigator>,
        documents: Arc<dyn DocumentStore>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        let event_sender = EventSender::new();
        let orders = OrderService::new(store.clone(), event_sender.clone(), navigator);
        let allocations = AllocationService::new(store.clone());
        let deletion = DeletionService::new(
            store.clone(),
            event_sender.clone(),
            prompter,
            documents,
        );
        Self {
            config,
            store,
            event_sender: Arc::new(event_sender),
            orders,
            allocations,
            deletion,
        }
    }
}
