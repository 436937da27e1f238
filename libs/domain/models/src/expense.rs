//! [libs/domain/models/src/expense.rs]
//! Expense line items and the distribution methods that spread them
//! across apartments.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The rule that assigns a per-apartment weight to an expense.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMethod {
    /// Weight = apartment's `share_general`.
    GeneralShare,
    /// Weight = apartment's `share_heating`; zero-share apartments are
    /// excluded from both numerator and denominator.
    HeatingShare,
    /// Weight = 1 / number of targets.
    EqualSplit,
    /// Weights are explicit per-apartment percentages, must sum to 100.
    Custom,
    /// Heating-specific: handled by the separate consumption algorithm,
    /// never dispatched through the generic weight table.
    ConsumptionBased,
}

/// One expense scoped to a building and to a period's date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseItem {
    pub id: Uuid,
    pub building_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub amount: Decimal,
    pub distribution_method: DistributionMethod,
    pub description: String,
    pub date: chrono::NaiveDate,

    /// `None` means every active apartment participates.
    pub included_apartment_ids: Option<Vec<Uuid>>,
    /// Required (and validated) when `distribution_method == Custom`.
    /// Maps apartment id to a percentage; must sum to 100 ± 0.01.
    pub custom_distribution: Option<HashMap<Uuid, f64>>,
    pub vat_percentage: Option<f64>,
}
