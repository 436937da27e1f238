//! [libs/domain/models/src/charge_line.rs]
//! Persisted per-(period, apartment) charge line. Destroyed and
//! recreated wholesale on every successful calculate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ChargeLine {
    pub id: Uuid,
    pub period_id: Uuid,
    pub apartment_id: Uuid,
    /// Sum of per-expense finals (excludes withdrawals and previous
    /// balance carry-forward).
    pub base_charge: Decimal,
    /// `base_charge` + heating + reserve + previous_balance − withdrawals.
    pub total_charge: Decimal,
}
