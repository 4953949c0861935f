use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::lenient_quantity;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum AllocationType {
    /// Partial release of remaining labels to a production run.
    #[default]
    #[strum(serialize = "production")]
    Production,
}

/// One entry of the append-only production allocation ledger.
///
/// Entries record the remaining quantity known at allocation time and are
/// never edited afterwards; if the product's ordered/produced quantities
/// change later, the entry stays a point-in-time audit record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Net remaining immediately before this allocation.
    pub current_remaining: i64,
    pub allocated_qty: i64,
    /// `current_remaining - allocated_qty`, never negative.
    pub remaining_after: i64,
    #[serde(default)]
    pub allocation_type: AllocationType,
}

/// Manual "total labels received" override recorded by the
/// production-detail view. `single` carries the count for single-class
/// products; `lid`/`tub` are used for combined LID & TUB products.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsReceived {
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub lid: i64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub tub: i64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub single: i64,
}
