//! [libs/domain/models/src/input.rs]
//! The Calculator's single input value. Assembled by the Orchestrator,
//! consumed by `charges_core_calc::calculate`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::apartment::Apartment;
use crate::expense::ExpenseItem;
use crate::heating::HeatingConsumption;
use crate::reserve::ReserveFundOperation;
use crate::settings::CalculationSettings;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CalculationInput {
    pub period_id: Uuid,
    pub building_id: Uuid,
    pub period_month: u32,
    pub period_year: i32,

    pub apartments: Vec<Apartment>,
    pub expenses: Vec<ExpenseItem>,
    pub heating_consumptions: Vec<HeatingConsumption>,
    pub reserve_operations: Vec<ReserveFundOperation>,
    /// Reserve fund balance carried in from the previous period. Per
    /// SPEC_FULL.md Open Questions, the core accepts this as an input —
    /// it never fabricates it.
    pub reserve_previous_balance: rust_decimal::Decimal,

    pub settings: CalculationSettings,

    /// Injected by the caller — the Calculator has no clock of its own.
    pub timestamp: DateTime<Utc>,
}
