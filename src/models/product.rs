use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborators::AttachmentRef;
use crate::models::{lenient_quantity, Allocation, ChangeRequest};

/// The label classes a packaging product can require. In-mold labels are
/// printed separately for the lid and the tub of a container; a product
/// orders one, the other, or both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ImlType {
    #[strum(serialize = "LID")]
    Lid,
    #[strum(serialize = "TUB")]
    Tub,
    #[strum(serialize = "LID & TUB")]
    LidAndTub,
}

/// One concrete label class of a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum LabelClass {
    #[strum(serialize = "LID")]
    Lid,
    #[strum(serialize = "TUB")]
    Tub,
}

impl ImlType {
    pub fn has_lid(self) -> bool {
        matches!(self, ImlType::Lid | ImlType::LidAndTub)
    }

    pub fn has_tub(self) -> bool {
        matches!(self, ImlType::Tub | ImlType::LidAndTub)
    }

    /// The label classes present for this type.
    pub fn classes(self) -> &'static [LabelClass] {
        match self {
            ImlType::Lid => &[LabelClass::Lid],
            ImlType::Tub => &[LabelClass::Tub],
            ImlType::LidAndTub => &[LabelClass::Lid, LabelClass::Tub],
        }
    }

    /// True when the product carries exactly one label class.
    pub fn is_single_class(self) -> bool {
        !matches!(self, ImlType::LidAndTub)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum DesignType {
    #[default]
    #[strum(serialize = "new")]
    New,
    #[strum(serialize = "existing")]
    Existing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum DesignStatus {
    #[default]
    #[strum(serialize = "pending")]
    Pending,
    #[strum(serialize = "approved")]
    Approved,
}

/// Artwork file reference. File handles are not stable across sessions,
/// so equality for diffing purposes is by name only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignFile {
    pub name: String,
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
}

impl DesignFile {
    pub fn same_file(a: Option<&DesignFile>, b: Option<&DesignFile>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// Per-product workflow state. A closed set: undefined transitions are
/// rejected by `services::order_status::transition` instead of silently
/// accepted.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ProductStatus {
    #[default]
    #[strum(serialize = "Artwork Pending")]
    ArtworkPending,
    #[strum(serialize = "Artwork Approved")]
    ArtworkApproved,
    #[strum(serialize = "Order Pending")]
    OrderPending,
    #[strum(serialize = "CR Approval Pending")]
    CrApprovalPending,
    #[strum(serialize = "PO Raised & Labels in Process")]
    PoRaisedLabelsInProcess,
    #[strum(serialize = "In Production")]
    InProduction,
    #[strum(serialize = "Dispatch Pending")]
    DispatchPending,
}

/// A labelled packaging component inside an order.
///
/// Label quantities deserialize through the parse-or-zero helper so a
/// half-migrated snapshot still reconciles. Stock figures are always
/// derived (`lid_stock`/`tub_stock`), never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    pub size: String,
    pub iml_name: String,
    pub iml_type: ImlType,

    #[serde(default, deserialize_with = "lenient_quantity")]
    pub lid_label_qty: i64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub lid_production_qty: i64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub tub_label_qty: i64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub tub_production_qty: i64,

    #[serde(default)]
    pub design_type: DesignType,
    #[serde(default)]
    pub design_status: DesignStatus,
    #[serde(default)]
    pub design_file: Option<DesignFile>,
    /// Set once artwork has been shared for sign-off by mail; approval of
    /// a shared design does not auto-advance the workflow status.
    #[serde(default)]
    pub design_shared_mail: bool,

    #[serde(default)]
    pub order_status: ProductStatus,
    #[serde(default)]
    pub move_to_purchase: bool,
    #[serde(default)]
    pub product_deleted: bool,
    /// Recorded on re-edit so a direct (edit-mode) save can restore the
    /// Artwork Approved status instead of routing through review.
    #[serde(default)]
    pub was_artwork_approved: bool,

    #[serde(default)]
    pub change_requests: Vec<ChangeRequest>,
    /// Denormalized cache of this product's ledger entries. Read-only
    /// projection; the keyed ledger in the snapshot is the source of truth.
    #[serde(default)]
    pub production_allocations: Vec<Allocation>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        product_name: impl Into<String>,
        size: impl Into<String>,
        iml_name: impl Into<String>,
        iml_type: ImlType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_name: product_name.into(),
            size: size.into(),
            iml_name: iml_name.into(),
            iml_type,
            lid_label_qty: 0,
            lid_production_qty: 0,
            tub_label_qty: 0,
            tub_production_qty: 0,
            design_type: DesignType::New,
            design_status: DesignStatus::Pending,
            design_file: None,
            design_shared_mail: false,
            order_status: ProductStatus::ArtworkPending,
            move_to_purchase: false,
            product_deleted: false,
            was_artwork_approved: false,
            change_requests: Vec::new(),
            production_allocations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn label_qty(&self, class: LabelClass) -> i64 {
        match class {
            LabelClass::Lid => self.lid_label_qty,
            LabelClass::Tub => self.tub_label_qty,
        }
    }

    pub fn production_qty(&self, class: LabelClass) -> i64 {
        match class {
            LabelClass::Lid => self.lid_production_qty,
            LabelClass::Tub => self.tub_production_qty,
        }
    }

    /// Lid labels still on hand: `max(0, ordered - produced)`. Derived,
    /// never persisted.
    pub fn lid_stock(&self) -> i64 {
        (self.lid_label_qty - self.lid_production_qty).max(0)
    }

    /// Tub labels still on hand: `max(0, ordered - produced)`. Derived,
    /// never persisted.
    pub fn tub_stock(&self) -> i64 {
        (self.tub_label_qty - self.tub_production_qty).max(0)
    }
}
