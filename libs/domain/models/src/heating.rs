//! [libs/domain/models/src/heating.rs]
//! Per-apartment heating consumption readings for a period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One consumption record per apartment per period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct HeatingConsumption {
    pub apartment_id: Uuid,
    /// Non-negative consumption units (e.g. liters of oil, kWh).
    pub consumption: Decimal,
    pub unit_price: Decimal,
    /// Carried through to the apartment's total but not part of the
    /// conservation invariant on the period's heating expense.
    pub previous_balance: Option<Decimal>,
}
