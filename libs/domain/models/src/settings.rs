//! [libs/domain/models/src/settings.rs]
//! Configuration surface recognized by the Calculator (§6).

use serde::{Deserialize, Serialize};

use crate::expense::DistributionMethod;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundingStrategy {
    /// Cyclically redistribute the rounding residual across targets
    /// ordered by weight descending, largest-weight target absorbing
    /// whatever remains under half a ULP.
    Distribute,
    /// The entire residual goes to the first target in iteration order.
    FirstApartment,
    /// The entire residual goes to the largest-weight target, ties
    /// broken by first-seen.
    LargestShare,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CalculationSettings {
    pub decimal_places: u32,
    pub rounding_strategy: RoundingStrategy,
    /// 0-100.
    pub reserve_fund_percentage: f64,
    pub reserve_fund_distribution: DistributionMethod,
    pub default_vat_percentage: f64,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            rounding_strategy: RoundingStrategy::Distribute,
            reserve_fund_percentage: 0.0,
            reserve_fund_distribution: DistributionMethod::GeneralShare,
            default_vat_percentage: 24.0,
        }
    }
}
