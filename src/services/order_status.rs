//! Product status state machine.
//!
//! The status set is closed and the transition table explicit; an event
//! fired in a state the table does not list is rejected with
//! `InvalidStatus` rather than silently accepted. Evaluation is per
//! product — an order has no status of its own, order-level views
//! aggregate over products.

use crate::errors::ServiceError;
use crate::models::ProductStatus;

/// Events that drive a product through its workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum StatusEvent {
    /// Artwork signed off (explicit approval or existing-design pick).
    DesignApproved,
    /// Explicit re-edit action on an approved product.
    ReEditRequested,
    /// A change request was submitted in request mode.
    ChangeRequestSubmitted,
    /// A change request was accepted or declined; either outcome
    /// releases the product back into the pipeline.
    ChangeRequestResolved,
    /// An edit-mode save completed on a product whose artwork had been
    /// approved before the re-edit.
    EditSaved,
    /// Manual marker: labels are on the production floor.
    ProductionStarted,
    /// Reconciliation found no remaining work for any label class.
    ProductionExhausted,
}

/// The from-state × event → to-state table.
pub fn transition(
    from: ProductStatus,
    event: StatusEvent,
) -> Result<ProductStatus, ServiceError> {
    use ProductStatus::*;
    use StatusEvent::*;

    let next = match (from, event) {
        (ArtworkPending, DesignApproved) => ArtworkApproved,
        (ArtworkApproved, ReEditRequested) => OrderPending,
        (OrderPending, EditSaved) => ArtworkApproved,
        (OrderPending, ChangeRequestSubmitted) => CrApprovalPending,
        (ArtworkPending, ChangeRequestSubmitted) => CrApprovalPending,
        (CrApprovalPending, ChangeRequestResolved) => PoRaisedLabelsInProcess,
        (PoRaisedLabelsInProcess, ProductionStarted) => InProduction,
        (InProduction, ProductionExhausted) => DispatchPending,
        (from, event) => {
            return Err(ServiceError::InvalidStatus(format!(
                "event {} is not valid in status '{}'",
                event, from
            )))
        }
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;
    use ProductStatus::*;
    use StatusEvent::*;

    #[test_case(ArtworkPending, DesignApproved, ArtworkApproved; "approval")]
    #[test_case(ArtworkApproved, ReEditRequested, OrderPending; "re-edit")]
    #[test_case(OrderPending, EditSaved, ArtworkApproved; "edit save restore")]
    #[test_case(OrderPending, ChangeRequestSubmitted, CrApprovalPending; "request from pending order")]
    #[test_case(ArtworkPending, ChangeRequestSubmitted, CrApprovalPending; "request from pending artwork")]
    #[test_case(CrApprovalPending, ChangeRequestResolved, PoRaisedLabelsInProcess; "review release")]
    #[test_case(PoRaisedLabelsInProcess, ProductionStarted, InProduction; "manual production marker")]
    #[test_case(InProduction, ProductionExhausted, DispatchPending; "automatic dispatch")]
    fn defined_transitions(from: ProductStatus, event: StatusEvent, expected: ProductStatus) {
        assert_eq!(transition(from, event).unwrap(), expected);
    }

    #[test_case(DispatchPending, ProductionExhausted; "terminal state")]
    #[test_case(ArtworkPending, ReEditRequested; "re-edit before approval")]
    #[test_case(InProduction, ChangeRequestSubmitted; "request mid production")]
    #[test_case(ArtworkApproved, DesignApproved; "double approval")]
    #[test_case(PoRaisedLabelsInProcess, ProductionExhausted; "dispatch before production")]
    fn undefined_transitions_are_rejected(from: ProductStatus, event: StatusEvent) {
        assert_matches!(
            transition(from, event),
            Err(ServiceError::InvalidStatus(_))
        );
    }

    #[test]
    fn full_walk_through_the_pipeline() {
        let mut status = ArtworkPending;
        for event in [
            DesignApproved,
            ReEditRequested,
            ChangeRequestSubmitted,
            ChangeRequestResolved,
            ProductionStarted,
            ProductionExhausted,
        ] {
            status = transition(status, event).unwrap();
        }
        assert_eq!(status, DispatchPending);
    }
}
