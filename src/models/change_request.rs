use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{DesignFile, DesignType, ImlType, LabelClass, Order, OrderEstimate, Product};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ChangeRequestType {
    #[strum(serialize = "change")]
    Change,
    #[strum(serialize = "delete")]
    Delete,
}

/// Review outcome of a change request. Write-once: after Accepted or
/// Declined no further transition is permitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ChangeRequestStatus {
    #[default]
    #[strum(serialize = "PENDING")]
    Pending,
    #[strum(serialize = "ACCEPTED")]
    Accepted,
    #[strum(serialize = "DECLINED")]
    Declined,
}

/// The editable field set of a product — what the edit form round-trips.
/// Also serves as the `original_details` snapshot stored on a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub product_name: String,
    pub size: String,
    pub iml_name: String,
    pub iml_type: ImlType,
    pub lid_label_qty: i64,
    pub lid_production_qty: i64,
    pub tub_label_qty: i64,
    pub tub_production_qty: i64,
    pub design_type: DesignType,
    pub design_file: Option<DesignFile>,
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            product_name: product.product_name.clone(),
            size: product.size.clone(),
            iml_name: product.iml_name.clone(),
            iml_type: product.iml_type,
            lid_label_qty: product.lid_label_qty,
            lid_production_qty: product.lid_production_qty,
            tub_label_qty: product.tub_label_qty,
            tub_production_qty: product.tub_production_qty,
            design_type: product.design_type,
            design_file: product.design_file.clone(),
        }
    }
}

/// Typed sparse diff over the tracked-field allow-list. A field is
/// present only when the edited value strictly differs from the
/// original; nothing outside this struct can ride along in a request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iml_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iml_type: Option<ImlType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lid_label_qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lid_production_qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tub_label_qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tub_production_qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_type: Option<DesignType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_file: Option<DesignFile>,
}

macro_rules! diff_field {
    ($patch:ident, $original:ident, $edited:ident, $field:ident) => {
        if $edited.$field != $original.$field {
            $patch.$field = Some($edited.$field.clone());
        }
    };
}

impl ProductPatch {
    /// Sparse diff between an edited draft and the original snapshot.
    /// The design file is compared by name, not identity, because file
    /// handles do not survive a session.
    pub fn between(original: &ProductDraft, edited: &ProductDraft) -> Self {
        let mut patch = ProductPatch::default();
        diff_field!(patch, original, edited, product_name);
        diff_field!(patch, original, edited, size);
        diff_field!(patch, original, edited, iml_name);
        diff_field!(patch, original, edited, iml_type);
        diff_field!(patch, original, edited, lid_label_qty);
        diff_field!(patch, original, edited, lid_production_qty);
        diff_field!(patch, original, edited, tub_label_qty);
        diff_field!(patch, original, edited, tub_production_qty);
        diff_field!(patch, original, edited, design_type);
        if !DesignFile::same_file(original.design_file.as_ref(), edited.design_file.as_ref()) {
            patch.design_file = edited.design_file.clone();
        }
        patch
    }

    /// Writes only the present keys onto the live product.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(v) = &self.product_name {
            product.product_name = v.clone();
        }
        if let Some(v) = &self.size {
            product.size = v.clone();
        }
        if let Some(v) = &self.iml_name {
            product.iml_name = v.clone();
        }
        if let Some(v) = self.iml_type {
            product.iml_type = v;
        }
        if let Some(v) = self.lid_label_qty {
            product.lid_label_qty = v;
        }
        if let Some(v) = self.lid_production_qty {
            product.lid_production_qty = v;
        }
        if let Some(v) = self.tub_label_qty {
            product.tub_label_qty = v;
        }
        if let Some(v) = self.tub_production_qty {
            product.tub_production_qty = v;
        }
        if let Some(v) = self.design_type {
            product.design_type = v;
        }
        if let Some(v) = &self.design_file {
            product.design_file = Some(v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ProductPatch::default()
    }

    /// True when the patch changes any ordered/produced quantity — the
    /// trigger for forcing a deliberate estimate re-entry.
    pub fn touches_quantities(&self) -> bool {
        self.lid_label_qty.is_some()
            || self.lid_production_qty.is_some()
            || self.tub_label_qty.is_some()
            || self.tub_production_qty.is_some()
    }
}

/// A proposed edit or deletion of a product awaiting review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: Uuid,
    pub request_type: ChangeRequestType,
    pub submitted_at: DateTime<Utc>,
    pub original_details: ProductDraft,
    pub requested_changes: ProductPatch,
    pub revised_estimate: OrderEstimate,
    #[serde(default)]
    pub status: ChangeRequestStatus,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

impl ChangeRequest {
    pub fn is_processed(&self) -> bool {
        self.status != ChangeRequestStatus::Pending
    }
}

/// Quantity sanity for an edited draft: nothing negative, and no class
/// producing more than was ordered.
pub fn validate_draft(draft: &ProductDraft) -> Result<(), ServiceError> {
    for (class, label_qty, production_qty) in [
        (LabelClass::Lid, draft.lid_label_qty, draft.lid_production_qty),
        (LabelClass::Tub, draft.tub_label_qty, draft.tub_production_qty),
    ] {
        if label_qty < 0 || production_qty < 0 {
            return Err(ServiceError::ValidationError(format!(
                "{} quantities must not be negative",
                class
            )));
        }
        if draft.iml_type.classes().contains(&class) && production_qty > label_qty {
            return Err(ServiceError::ValidationError(format!(
                "{} production quantity exceeds the ordered label quantity",
                class
            )));
        }
    }
    Ok(())
}

/// The estimate-revision gate: every change or delete submission must
/// carry a non-empty estimate number and a positive value.
pub fn validate_revised_estimate(estimate: &OrderEstimate) -> Result<(), ServiceError> {
    if estimate.estimated_number.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "revised estimate number must not be empty".into(),
        ));
    }
    if estimate.estimated_value <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "revised estimate value must be positive".into(),
        ));
    }
    Ok(())
}

/// Prefill for the estimate-revision field. Deletions and quantity
/// changes force a blank field so the new figure is entered
/// deliberately instead of drifting along from the original quote.
pub fn estimate_prefill(
    order: &Order,
    patch: &ProductPatch,
    request_type: ChangeRequestType,
) -> Option<OrderEstimate> {
    let force_blank =
        request_type == ChangeRequestType::Delete || patch.touches_quantities();
    if force_blank {
        None
    } else {
        Some(order.order_estimate.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactInfo;
    use rust_decimal_macros::dec;

    fn base_draft() -> ProductDraft {
        ProductDraft {
            product_name: "Round Tub".into(),
            size: "1L".into(),
            iml_name: "IML-77".into(),
            iml_type: ImlType::LidAndTub,
            lid_label_qty: 1000,
            lid_production_qty: 600,
            tub_label_qty: 800,
            tub_production_qty: 100,
            design_type: DesignType::New,
            design_file: Some(DesignFile {
                name: "v1.pdf".into(),
                attachment: None,
            }),
        }
    }

    #[test]
    fn diff_contains_only_changed_fields() {
        let original = base_draft();
        let mut edited = original.clone();
        edited.size = "2L".into();
        edited.lid_label_qty = 1200;

        let patch = ProductPatch::between(&original, &edited);
        assert_eq!(patch.size.as_deref(), Some("2L"));
        assert_eq!(patch.lid_label_qty, Some(1200));
        assert_eq!(patch.product_name, None);
        assert_eq!(patch.design_file, None);
        assert!(patch.touches_quantities());
    }

    #[test]
    fn identical_drafts_produce_empty_diff() {
        let original = base_draft();
        let patch = ProductPatch::between(&original, &original.clone());
        assert!(patch.is_empty());
        assert!(!patch.touches_quantities());
    }

    #[test]
    fn design_file_rename_is_a_change_but_reattachment_is_not() {
        let original = base_draft();

        // Same name, different handle: not a change.
        let mut edited = original.clone();
        edited.design_file = Some(DesignFile {
            name: "v1.pdf".into(),
            attachment: Some(crate::collaborators::AttachmentRef {
                id: "other-handle".into(),
                display_name: "v1.pdf".into(),
            }),
        });
        assert!(ProductPatch::between(&original, &edited).is_empty());

        // New name: a change.
        let mut edited = original.clone();
        edited.design_file = Some(DesignFile {
            name: "v2.pdf".into(),
            attachment: None,
        });
        let patch = ProductPatch::between(&original, &edited);
        assert_eq!(patch.design_file.as_ref().map(|f| f.name.as_str()), Some("v2.pdf"));
    }

    #[test]
    fn diff_apply_round_trip_reproduces_the_patch() {
        let original = base_draft();
        let mut edited = original.clone();
        edited.product_name = "Square Tub".into();
        edited.tub_label_qty = 900;
        edited.design_type = DesignType::Existing;
        let patch = ProductPatch::between(&original, &edited);

        let mut product = Product::new("Round Tub", "1L", "IML-77", ImlType::LidAndTub);
        product.lid_label_qty = original.lid_label_qty;
        product.lid_production_qty = original.lid_production_qty;
        product.tub_label_qty = original.tub_label_qty;
        product.tub_production_qty = original.tub_production_qty;
        product.design_file = original.design_file.clone();
        let before = ProductDraft::from(&product);

        patch.apply_to(&mut product);
        let after = ProductDraft::from(&product);

        assert_eq!(ProductPatch::between(&before, &after), patch);
    }

    #[test]
    fn draft_validation_rejects_negative_and_over_produced_quantities() {
        let mut draft = base_draft();
        assert!(validate_draft(&draft).is_ok());

        draft.lid_production_qty = draft.lid_label_qty + 1;
        assert!(validate_draft(&draft).is_err());

        let mut draft = base_draft();
        draft.tub_label_qty = -1;
        assert!(validate_draft(&draft).is_err());

        // Over-production in a class the iml type does not carry is not
        // this gate's problem.
        let mut draft = base_draft();
        draft.iml_type = ImlType::Lid;
        draft.tub_production_qty = draft.tub_label_qty + 50;
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn estimate_gate_rejects_blank_and_non_positive() {
        let blank = OrderEstimate {
            estimated_number: "  ".into(),
            estimated_value: dec!(100),
        };
        assert!(validate_revised_estimate(&blank).is_err());

        let zero = OrderEstimate {
            estimated_number: "EST-001".into(),
            estimated_value: Decimal::ZERO,
        };
        assert!(validate_revised_estimate(&zero).is_err());

        let ok = OrderEstimate {
            estimated_number: "EST-001".into(),
            estimated_value: dec!(50000),
        };
        assert!(validate_revised_estimate(&ok).is_ok());
    }

    #[test]
    fn prefill_forced_blank_for_deletes_and_quantity_changes() {
        let mut order = Order::new("ORD-9", ContactInfo::default());
        order.order_estimate = OrderEstimate {
            estimated_number: "EST-008".into(),
            estimated_value: dec!(40000),
        };

        let name_only = ProductPatch {
            product_name: Some("New Name".into()),
            ..ProductPatch::default()
        };
        assert_eq!(
            estimate_prefill(&order, &name_only, ChangeRequestType::Change),
            Some(order.order_estimate.clone())
        );

        let qty = ProductPatch {
            lid_label_qty: Some(500),
            ..ProductPatch::default()
        };
        assert_eq!(estimate_prefill(&order, &qty, ChangeRequestType::Change), None);
        assert_eq!(
            estimate_prefill(&order, &ProductPatch::default(), ChangeRequestType::Delete),
            None
        );
    }
}
