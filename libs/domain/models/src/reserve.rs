//! [libs/domain/models/src/reserve.rs]
//! Reserve-fund contributions and withdrawals for a period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expense::DistributionMethod;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReserveOperationType {
    Contribution,
    Withdrawal,
}

/// A single reserve-fund movement within a period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ReserveFundOperation {
    pub operation_type: ReserveOperationType,
    pub amount: Decimal,
    pub description: String,
    /// Only meaningful for `Contribution`; `Withdrawal` always uses the
    /// same method for symmetry, but the field stays `Option` so a
    /// withdrawal need not specify one.
    pub distribution_method: Option<DistributionMethod>,
}
