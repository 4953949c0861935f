//! Change-request workflow: edit-mode direct saves, request-mode
//! submissions, the estimate gate, reviewer accept/decline, and the
//! write-once status guarantee.

mod common;

use assert_matches::assert_matches;
use common::{lid_product, order_with_products, TestApp};
use imltrack::commands::change_requests::{
    AcceptChangeRequestCommand, DeclineChangeRequestCommand, SubmitChangeRequestCommand,
};
use imltrack::commands::products::ApplyProductEditCommand;
use imltrack::commands::Command;
use imltrack::errors::ServiceError;
use imltrack::models::{
    ChangeRequestStatus, ChangeRequestType, InvoiceStatus, OrderEstimate, ProductDraft,
    ProductStatus,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn revised(number: &str, value: rust_decimal::Decimal) -> OrderEstimate {
    OrderEstimate {
        estimated_number: number.into(),
        estimated_value: value,
    }
}

fn seeded_app(status: ProductStatus) -> (TestApp, Uuid, Uuid) {
    let app = TestApp::new();
    let mut product = lid_product(1000, 600);
    product.order_status = status;
    let product_id = product.id;
    let order_id = app.seed_order(order_with_products(vec![product]));
    (app, order_id, product_id)
}

#[test]
fn edit_mode_applies_diff_and_estimate_without_a_request_record() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::ArtworkPending);

    let mut edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());
    edited.product_name = "Square Lid".into();

    let patch = ApplyProductEditCommand {
        order_id,
        product_id,
        edited,
        revised_estimate: revised("EST-009", dec!(50000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    assert_eq!(patch.product_name.as_deref(), Some("Square Lid"));

    let order = app.order(order_id);
    let product = order.product(product_id).unwrap();
    assert_eq!(product.product_name, "Square Lid");
    assert_eq!(order.order_estimate.estimated_number, "EST-009");
    assert_eq!(order.order_estimate.estimated_value, dec!(50000));
    assert!(product.change_requests.is_empty());
}

#[test]
fn edit_mode_restores_artwork_approved_after_re_edit() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::OrderPending);
    {
        let mut snapshot = app.snapshot();
        snapshot.orders[0]
            .product_mut(product_id)
            .unwrap()
            .was_artwork_approved = true;
        app.seed(snapshot);
    }

    let edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());
    ApplyProductEditCommand {
        order_id,
        product_id,
        edited,
        revised_estimate: revised("EST-002", dec!(41000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    let product = app.order(order_id).product(product_id).cloned().unwrap();
    assert_eq!(product.order_status, ProductStatus::ArtworkApproved);
    assert!(!product.was_artwork_approved);
}

#[test]
fn edit_mode_rejects_a_blank_or_non_positive_estimate() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::ArtworkPending);
    let edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());

    for estimate in [revised("", dec!(100)), revised("EST-3", dec!(0))] {
        let err = ApplyProductEditCommand {
            order_id,
            product_id,
            edited: edited.clone(),
            revised_estimate: estimate,
        }
        .execute(app.state.store.clone(), app.state.event_sender.clone())
        .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }
}

#[test]
fn request_mode_parks_the_product_in_cr_approval_pending() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::OrderPending);

    let mut edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());
    edited.lid_label_qty = 1200;

    let result = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Change,
        edited: Some(edited),
        revised_estimate: revised("EST-010", dec!(55000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    let order = app.order(order_id);
    let product = order.product(product_id).unwrap();
    assert_eq!(product.order_status, ProductStatus::CrApprovalPending);
    // The live product is untouched until review.
    assert_eq!(product.lid_label_qty, 1000);
    assert_eq!(order.order_estimate.estimated_number, "EST-001");

    let request = &product.change_requests[0];
    assert_eq!(request.id, result.request_id);
    assert_eq!(request.status, ChangeRequestStatus::Pending);
    assert_eq!(request.requested_changes.lid_label_qty, Some(1200));
    assert_eq!(request.original_details.lid_label_qty, 1000);
}

#[test]
fn change_request_with_no_changes_is_rejected() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::OrderPending);
    let edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());

    let err = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Change,
        edited: Some(edited),
        revised_estimate: revised("EST-010", dec!(55000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert_eq!(
        app.order(order_id).product(product_id).unwrap().order_status,
        ProductStatus::OrderPending
    );
}

#[test]
fn delete_request_needs_no_diff() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::ArtworkPending);

    let result = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Delete,
        edited: None,
        revised_estimate: revised("EST-011", dec!(25000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    assert!(result.requested_changes.is_empty());
    assert_eq!(
        app.order(order_id).product(product_id).unwrap().order_status,
        ProductStatus::CrApprovalPending
    );
}

#[test]
fn accepting_a_change_request_applies_the_diff_and_releases_the_product() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::OrderPending);
    let mut edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());
    edited.lid_label_qty = 1200;
    edited.size = "2L".into();

    let submitted = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Change,
        edited: Some(edited),
        revised_estimate: revised("EST-010", dec!(55000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    AcceptChangeRequestCommand {
        order_id,
        product_id,
        request_id: submitted.request_id,
        remarks: Some("approved by planning".into()),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    let order = app.order(order_id);
    let product = order.product(product_id).unwrap();
    assert_eq!(product.lid_label_qty, 1200);
    assert_eq!(product.size, "2L");
    assert_eq!(product.order_status, ProductStatus::PoRaisedLabelsInProcess);
    assert_eq!(order.order_estimate.estimated_value, dec!(55000));

    let request = &product.change_requests[0];
    assert_eq!(request.status, ChangeRequestStatus::Accepted);
    assert!(request.processed_at.is_some());
}

#[test]
fn accepting_a_delete_request_removes_the_product_and_drafts_an_invoice() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::OrderPending);

    let submitted = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Delete,
        edited: None,
        revised_estimate: revised("EST-012", dec!(25000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    AcceptChangeRequestCommand {
        order_id,
        product_id,
        request_id: submitted.request_id,
        remarks: None,
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    let order = app.order(order_id);
    assert!(order.product(product_id).is_none());
    assert_eq!(order.order_estimate.estimated_value, dec!(25000));

    // Draft invoice for the removed budget: 40000 - 25000.
    assert_eq!(order.invoices.len(), 1);
    let invoice = &order.invoices[0];
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.product_id, product_id);
    assert_eq!(invoice.amount, dec!(15000));
    assert_eq!(invoice.invoice_no, None);
}

#[test]
fn declining_still_releases_the_product() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::OrderPending);
    let mut edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());
    edited.product_name = "Other".into();

    let submitted = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Change,
        edited: Some(edited),
        revised_estimate: revised("EST-013", dec!(42000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    DeclineChangeRequestCommand {
        order_id,
        product_id,
        request_id: submitted.request_id,
        remarks: "quantities cannot change after PO".into(),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    let order = app.order(order_id);
    let product = order.product(product_id).unwrap();
    // Diff discarded, product released anyway.
    assert_eq!(product.product_name, "Round Lid");
    assert_eq!(product.order_status, ProductStatus::PoRaisedLabelsInProcess);
    // Estimate stays put on a decline.
    assert_eq!(order.order_estimate.estimated_value, dec!(40000));

    let request = &product.change_requests[0];
    assert_eq!(request.status, ChangeRequestStatus::Declined);
    assert_eq!(
        request.remarks.as_deref(),
        Some("quantities cannot change after PO")
    );
}

#[test]
fn processed_requests_are_write_once() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::OrderPending);
    let mut edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());
    edited.product_name = "Other".into();

    let submitted = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Change,
        edited: Some(edited),
        revised_estimate: revised("EST-014", dec!(43000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    AcceptChangeRequestCommand {
        order_id,
        product_id,
        request_id: submitted.request_id,
        remarks: None,
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap();

    // Second accept and a late decline both bounce off.
    let err = AcceptChangeRequestCommand {
        order_id,
        product_id,
        request_id: submitted.request_id,
        remarks: None,
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap_err();
    assert_matches!(err, ServiceError::InvariantViolation(_));

    let err = DeclineChangeRequestCommand {
        order_id,
        product_id,
        request_id: submitted.request_id,
        remarks: "too late".into(),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap_err();
    assert_matches!(err, ServiceError::InvariantViolation(_));

    assert_eq!(
        app.order(order_id).product(product_id).unwrap().change_requests[0].status,
        ChangeRequestStatus::Accepted
    );
}

#[test]
fn submission_is_rejected_outside_the_defined_source_states() {
    let (app, order_id, product_id) = seeded_app(ProductStatus::InProduction);
    let mut edited = ProductDraft::from(app.order(order_id).product(product_id).unwrap());
    edited.product_name = "Other".into();

    let err = SubmitChangeRequestCommand {
        order_id,
        product_id,
        request_type: ChangeRequestType::Change,
        edited: Some(edited),
        revised_estimate: revised("EST-015", dec!(44000)),
    }
    .execute(app.state.store.clone(), app.state.event_sender.clone())
    .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
}
