//! [apps/orchestrator/src/input_builder.rs]
//! Assembles a `CalculationInput` from loaded entities, the category
//! default table, and per-call options. The only place expense
//! `distribution_method` is decided — whatever the storage layer
//! carried is overwritten here, per §4.3.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use charges_domain_models::{
    Apartment, CalculationInput, CalculationSettings, ExpenseItem, HeatingConsumption, Period,
    ReserveFundOperation,
};

use crate::category_map::resolve_method;
use crate::options::CalculateOptions;

#[allow(clippy::too_many_arguments)]
pub fn build_input(
    period: &Period,
    apartments: Vec<Apartment>,
    mut expenses: Vec<ExpenseItem>,
    heating_consumptions: Vec<HeatingConsumption>,
    reserve_operations: Vec<ReserveFundOperation>,
    reserve_previous_balance: Decimal,
    settings: CalculationSettings,
    options: &CalculateOptions,
    timestamp: DateTime<Utc>,
) -> CalculationInput {
    for expense in &mut expenses {
        expense.distribution_method = resolve_method(&expense.category_name, &options.category_overrides);
    }

    let heating_consumptions = if options.include_heating {
        heating_consumptions
    } else {
        Vec::new()
    };

    CalculationInput {
        period_id: period.id,
        building_id: period.building_id,
        period_month: period.start_date.month(),
        period_year: period.start_date.year(),
        apartments,
        expenses,
        heating_consumptions,
        reserve_operations,
        reserve_previous_balance,
        settings,
        timestamp,
    }
}
