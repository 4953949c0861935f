//! Query surface: lookups, the remaining-work filter, and the person
//! directory side-table.

mod common;

use assert_matches::assert_matches;
use common::{lid_product, order_with_products, TestApp};
use imltrack::commands::allocations::RecordAllocationCommand;
use imltrack::commands::Command;
use imltrack::errors::ServiceError;
use imltrack::models::Person;
use uuid::Uuid;

#[test]
fn product_lookup_reports_stale_references_as_not_found() {
    let app = TestApp::new();
    let product = lid_product(1000, 600);
    let product_id = product.id;
    let order_id = app.seed_order(order_with_products(vec![product]));

    let found = app.state.orders.get_product(order_id, product_id).unwrap();
    assert_eq!(found.id, product_id);

    assert_matches!(
        app.state.orders.get_product(order_id, Uuid::new_v4()),
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        app.state.orders.get_product(Uuid::new_v4(), product_id),
        Err(ServiceError::NotFound(_))
    );
}

#[test]
fn remaining_work_filter_skips_exhausted_and_deleted_products() {
    let app = TestApp::new();
    let open = lid_product(1000, 600);
    let open_id = open.id;
    let exhausted = lid_product(500, 500);
    let mut deleted = lid_product(300, 0);
    deleted.product_deleted = true;
    app.seed_order(order_with_products(vec![open, exhausted, deleted]));

    let work: Vec<_> = app.state.orders.products_with_remaining_work().unwrap();
    assert_eq!(work.len(), 1);
    assert_eq!(work[0].1.id, open_id);
}

#[test]
fn allocation_totals_track_the_ledger() {
    let app = TestApp::new();
    let product = lid_product(1000, 600);
    let product_id = product.id;
    let order_id = app.seed_order(order_with_products(vec![product]));

    assert_eq!(
        app.state
            .allocations
            .total_allocated(order_id, product_id)
            .unwrap(),
        0
    );

    for quantity in [120, 80] {
        RecordAllocationCommand {
            order_id,
            product_id,
            quantity,
        }
        .execute(app.state.store.clone(), app.state.event_sender.clone())
        .unwrap();
    }

    assert_eq!(
        app.state
            .allocations
            .total_allocated(order_id, product_id)
            .unwrap(),
        200
    );
}

#[test]
fn person_directory_round_trips() {
    let app = TestApp::new();
    assert!(app.state.orders.people().unwrap().is_empty());

    let err = app
        .state
        .orders
        .add_person(Person {
            id: Uuid::new_v4(),
            name: "  ".into(),
            phone: None,
            company: None,
        })
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    app.state
        .orders
        .add_person(Person {
            id: Uuid::new_v4(),
            name: "S. Iyer".into(),
            phone: Some("98200 11111".into()),
            company: Some("Acme Packaging".into()),
        })
        .unwrap();

    let people = app.state.orders.people().unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].name, "S. Iyer");
}
