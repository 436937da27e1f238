//! [libs/domain/models/src/output.rs]
//! The Calculator's single output value: a fully-itemized, auditable
//! breakdown of what each apartment owes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expense::DistributionMethod;
use crate::settings::CalculationSettings;

/// Bumped whenever the calculation algorithm changes in a way that
/// could alter results for identical input. Emitted verbatim into every
/// output and into the audit trail, so a stored calculation can be
/// traced back to the algorithm version that produced it.
pub const CALCULATION_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct OutputMetadata {
    pub timestamp: DateTime<Utc>,
    pub period_id: Uuid,
    pub building_id: Uuid,
    pub period_month: u32,
    pub period_year: i32,
    pub settings: CalculationSettings,
    /// SHA-256 over the canonical JSON of the semantically relevant
    /// input fields. See `charges_core_calc::hashing`.
    pub input_hash: String,
    pub calculation_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseBreakdownItem {
    pub expense_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub description: String,
    pub total_amount: Decimal,
    pub method: DistributionMethod,
    /// This apartment's share of the weight pool, as a percentage.
    pub share_percentage: f64,
    /// Pre-reconciliation rounded amount.
    pub calculated_amount: Decimal,
    /// Post-reconciliation amount; `Σ final == total_amount` exactly.
    pub final_amount: Decimal,
    pub rounding_adjustment: Decimal,
    pub vat_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct HeatingBreakdown {
    pub variable_cost: Decimal,
    pub fixed_cost_share: Decimal,
    /// `variable_cost + fixed_cost_share`, before `previous_balance`.
    pub final_amount: Decimal,
    pub rounding_adjustment: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ReserveFundBreakdown {
    pub contributions: Decimal,
    pub withdrawals: Decimal,
    /// `contributions − withdrawals`, already reconciled.
    pub final_amount: Decimal,
    pub rounding_adjustment: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ApartmentCharge {
    pub apartment_id: Uuid,
    pub apartment_number: String,
    pub share_general: f64,
    pub share_heating: f64,

    pub expense_breakdown_items: Vec<ExpenseBreakdownItem>,
    pub heating: Option<HeatingBreakdown>,
    pub reserve_fund: Option<ReserveFundBreakdown>,

    pub previous_balance: Decimal,
    /// Σ expense finals + heating final + reserve final.
    pub subtotal: Decimal,
    /// Σ of every rounding adjustment applied to this apartment.
    pub total_adjustments: Decimal,
    /// `subtotal + previous_balance`. Withdrawals are already folded
    /// into `reserve_fund.final_amount` as a negative contribution.
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CategorySummary {
    pub category_id: Uuid,
    pub category_name: String,
    pub method: DistributionMethod,
    pub total_amount: Decimal,
    pub expense_count: u32,
    pub apartments_charged: u32,
    pub total_distributed: Decimal,
    /// `|total_distributed − total_amount|`, must be < 10^(−decimal_places).
    pub distribution_variance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ReserveFundSummary {
    pub previous_balance: Decimal,
    pub total_contributions: Decimal,
    pub total_withdrawals: Decimal,
    /// `previous_balance + total_contributions − total_withdrawals`.
    pub new_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CalculationOutput {
    pub metadata: OutputMetadata,
    pub apartment_charges: Vec<ApartmentCharge>,
    pub category_summaries: Vec<CategorySummary>,
    pub reserve_fund_summary: Option<ReserveFundSummary>,

    /// Sum of every expense amount (heating included); excludes reserve
    /// fund operations, which reconcile separately via
    /// `reserve_fund_summary`.
    pub total_expenses: Decimal,
    pub total_distributed: Decimal,
    pub distribution_variance: Decimal,
    /// Grand total of every rounding adjustment applied anywhere,
    /// including reserve fund operations.
    pub total_rounding_adjustments: Decimal,

    pub validation_errors: Vec<String>,
    pub warnings: Vec<String>,
}
