//! [libs/domain/models/src/apartment.rs]
//! The apartment (co-owned unit) entity. Belongs to exactly one building.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A co-owned unit inside a building.
///
/// The extra share coefficients (`share_elevator`, `share_special`,
/// `share_owner`, `share_other`) are carried through for display only —
/// the Calculator never dispatches on them. See SPEC_FULL.md Open
/// Questions: treat them as synonyms of `share_general` until a policy
/// explicitly selects one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Apartment {
    pub id: Uuid,
    pub building_id: Uuid,
    /// Display number, e.g. "3B".
    pub number: String,
    /// Display floor, e.g. "3rd".
    pub floor: String,

    /// General co-ownership share, percent in [0, 100].
    pub share_general: f64,
    /// Heating-specific share, percent in [0, 100].
    pub share_heating: f64,

    pub share_elevator: Option<f64>,
    pub share_special: Option<f64>,
    pub share_owner: Option<f64>,
    pub share_other: Option<f64>,

    pub is_occupied: bool,
    /// An excluded apartment participates in no distribution; its prior
    /// data is preserved for audit but it never appears in calculator
    /// output.
    pub is_excluded: bool,
}

impl Apartment {
    /// Active apartments are the ones the Calculator ever distributes to.
    pub fn is_active(&self) -> bool {
        !self.is_excluded
    }
}
