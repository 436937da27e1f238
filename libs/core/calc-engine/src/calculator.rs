//! [libs/core/calc-engine/src/calculator.rs]
//! The pure calculation entrypoint (§4.1): one operation, `calculate`,
//! composing validation, per-expense distribution and reconciliation,
//! the heating sub-algorithm, and reserve-fund handling into a single
//! auditable `CalculationOutput`.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use charges_domain_models::{
    Apartment, ApartmentCharge, CalculationInput, CalculationOutput, CategorySummary, CoreError,
    DistributionMethod, ExpenseBreakdownItem, ExpenseItem, HeatingBreakdown, OutputMetadata,
    ReserveFundBreakdown, ReserveFundSummary, CALCULATION_VERSION,
};

use crate::distribution::{active_targets, compute_weights};
use crate::hashing::input_hash;
use crate::heating::{canonical_order, distribute_heating};
use crate::money::{from_minor_units, to_minor_units};
use crate::reconciliation::distribute_and_reconcile;
use crate::reserve::distribute_reserve_operations;
use crate::validation::validate;

/// Per-apartment state built up while walking expenses, heating, and
/// reserve operations; converted into an [`ApartmentCharge`] once every
/// contribution has been recorded.
struct ApartmentAccumulator<'a> {
    apartment: &'a Apartment,
    expense_breakdown_items: Vec<ExpenseBreakdownItem>,
    heating: Option<HeatingBreakdown>,
    reserve_fund: Option<ReserveFundBreakdown>,
    previous_balance: Decimal,
    total_adjustments_units: i64,
}

impl<'a> ApartmentAccumulator<'a> {
    fn new(apartment: &'a Apartment) -> Self {
        Self {
            apartment,
            expense_breakdown_items: Vec::new(),
            heating: None,
            reserve_fund: None,
            previous_balance: Decimal::ZERO,
            total_adjustments_units: 0,
        }
    }

    fn into_charge(self, dp: u32) -> ApartmentCharge {
        let expense_finals: i64 = self
            .expense_breakdown_items
            .iter()
            .map(|item| to_minor_units(item.final_amount, dp))
            .sum();
        let heating_final = self
            .heating
            .as_ref()
            .map(|heating| to_minor_units(heating.final_amount, dp))
            .unwrap_or(0);
        let reserve_final = self
            .reserve_fund
            .as_ref()
            .map(|reserve| to_minor_units(reserve.final_amount, dp))
            .unwrap_or(0);

        let subtotal = from_minor_units(expense_finals + heating_final + reserve_final, dp);
        let total = subtotal + self.previous_balance;

        ApartmentCharge {
            apartment_id: self.apartment.id,
            apartment_number: self.apartment.number.clone(),
            share_general: self.apartment.share_general,
            share_heating: self.apartment.share_heating,
            expense_breakdown_items: self.expense_breakdown_items,
            heating: self.heating,
            reserve_fund: self.reserve_fund,
            previous_balance: self.previous_balance,
            subtotal,
            total_adjustments: from_minor_units(self.total_adjustments_units, dp),
            total,
        }
    }
}

/// Per-category running total, keyed by `category_id`; sealed into a
/// [`CategorySummary`] once every expense in the category has been
/// distributed.
struct CategoryAccumulator {
    category_id: Uuid,
    category_name: String,
    method: DistributionMethod,
    total_amount_units: i64,
    expense_count: u32,
    apartments_charged: HashSet<Uuid>,
    total_distributed_units: i64,
}

impl CategoryAccumulator {
    fn new(expense: &ExpenseItem) -> Self {
        Self {
            category_id: expense.category_id,
            category_name: expense.category_name.clone(),
            method: expense.distribution_method,
            total_amount_units: 0,
            expense_count: 0,
            apartments_charged: HashSet::new(),
            total_distributed_units: 0,
        }
    }

    fn record(&mut self, amount_units: i64, distributed_units: i64, targets: impl Iterator<Item = Uuid>) {
        self.total_amount_units += amount_units;
        self.expense_count += 1;
        self.total_distributed_units += distributed_units;
        self.apartments_charged.extend(targets);
    }

    fn into_summary(self, dp: u32) -> CategorySummary {
        let total_amount = from_minor_units(self.total_amount_units, dp);
        let total_distributed = from_minor_units(self.total_distributed_units, dp);
        CategorySummary {
            category_id: self.category_id,
            category_name: self.category_name,
            method: self.method,
            total_amount,
            expense_count: self.expense_count,
            apartments_charged: self.apartments_charged.len() as u32,
            total_distributed,
            distribution_variance: (total_distributed - total_amount).abs(),
        }
    }
}

/// Runs the full calculation in one pass: validate, distribute every
/// non-heating expense, split the consumption-based heating expense (if
/// any), apply reserve-fund operations in order, then aggregate per
/// apartment and per category. Never partially succeeds — either a
/// complete output (possibly carrying warnings) or a
/// `ValidationFailed`/`InvalidCustomDistribution` error.
#[instrument(skip_all, fields(period_id = %input.period_id, building_id = %input.building_id))]
pub fn calculate(input: &CalculationInput) -> Result<CalculationOutput, CoreError> {
    let validation_errors = validate(input);
    if !validation_errors.is_empty() {
        return Err(CoreError::ValidationFailed(validation_errors));
    }

    let dp = input.settings.decimal_places;
    let strategy = input.settings.rounding_strategy;
    let mut warnings: Vec<String> = Vec::new();

    let active_apartments: Vec<&Apartment> =
        input.apartments.iter().filter(|apartment| apartment.is_active()).collect();

    let mut accumulators: HashMap<Uuid, ApartmentAccumulator> = active_apartments
        .iter()
        .map(|apartment| (apartment.id, ApartmentAccumulator::new(apartment)))
        .collect();
    let mut category_totals: HashMap<Uuid, CategoryAccumulator> = HashMap::new();

    let mut total_expenses_units: i64 = 0;
    let mut total_distributed_units: i64 = 0;
    let mut total_rounding_adjustment_units: i64 = 0;

    for consumption in &input.heating_consumptions {
        if let Some(previous_balance) = consumption.previous_balance {
            if let Some(accumulator) = accumulators.get_mut(&consumption.apartment_id) {
                accumulator.previous_balance = previous_balance;
            }
        }
    }

    // CONSUMPTION_BASED expenses are handled by the heating sub-algorithm,
    // never by the generic weight-table dispatch (§4.1).
    let (heating_expenses, generic_expenses): (Vec<&ExpenseItem>, Vec<&ExpenseItem>) = input
        .expenses
        .iter()
        .partition(|expense| expense.distribution_method == DistributionMethod::ConsumptionBased);

    for expense in &generic_expenses {
        let amount_units = to_minor_units(expense.amount, dp);
        total_expenses_units += amount_units;

        let targets = active_targets(&input.apartments, expense.included_apartment_ids.as_deref());
        if targets.is_empty() {
            warnings.push(format!(
                "expense {} has no eligible targets and contributes €0",
                expense.id
            ));
            category_totals
                .entry(expense.category_id)
                .or_insert_with(|| CategoryAccumulator::new(expense))
                .record(amount_units, 0, std::iter::empty());
            continue;
        }

        let weights = compute_weights(
            expense.distribution_method,
            expense.id,
            &targets,
            expense.custom_distribution.as_ref(),
        )?;
        let sum_weights: f64 = weights.values().sum();
        let expense_order = canonical_order(&targets);
        let shares = distribute_and_reconcile(amount_units, &weights, strategy, &expense_order);

        let mut distributed_units = 0i64;
        for apartment in &targets {
            let Some(share) = shares.get(&apartment.id).copied() else {
                continue;
            };
            let weight = weights.get(&apartment.id).copied().unwrap_or(0.0);
            let share_percentage = if sum_weights > 0.0 { weight / sum_weights * 100.0 } else { 0.0 };

            let item = ExpenseBreakdownItem {
                expense_id: expense.id,
                category_id: expense.category_id,
                category_name: expense.category_name.clone(),
                description: expense.description.clone(),
                total_amount: expense.amount,
                method: expense.distribution_method,
                share_percentage,
                calculated_amount: from_minor_units(share.calculated_units, dp),
                final_amount: from_minor_units(share.final_units, dp),
                rounding_adjustment: from_minor_units(share.adjustment_units(), dp),
                vat_percentage: expense
                    .vat_percentage
                    .or(Some(input.settings.default_vat_percentage)),
            };

            distributed_units += share.final_units;
            total_rounding_adjustment_units += share.adjustment_units();

            if let Some(accumulator) = accumulators.get_mut(&apartment.id) {
                accumulator.total_adjustments_units += share.adjustment_units();
                accumulator.expense_breakdown_items.push(item);
            }
        }

        total_distributed_units += distributed_units;
        category_totals
            .entry(expense.category_id)
            .or_insert_with(|| CategoryAccumulator::new(expense))
            .record(amount_units, distributed_units, targets.iter().map(|a| a.id));
    }

    if heating_expenses.len() > 1 {
        warnings.push(format!(
            "{} consumption-based expenses found; their amounts were combined into a single heating calculation",
            heating_expenses.len()
        ));
    }

    if let Some(representative) = heating_expenses.first().copied() {
        let total_heating_amount: Decimal = heating_expenses.iter().map(|expense| expense.amount).sum();
        let amount_units = to_minor_units(total_heating_amount, dp);
        total_expenses_units += amount_units;

        let heating_targets =
            active_targets(&input.apartments, representative.included_apartment_ids.as_deref());
        let outcome = distribute_heating(
            &heating_targets,
            &input.heating_consumptions,
            amount_units,
            dp,
            strategy,
        );
        warnings.extend(outcome.warnings);

        let mut distributed_units = 0i64;
        for apartment in &heating_targets {
            let Some(share) = outcome.per_apartment.get(&apartment.id).copied() else {
                continue;
            };
            let breakdown = HeatingBreakdown {
                variable_cost: from_minor_units(share.variable_cost_units, dp),
                fixed_cost_share: from_minor_units(share.fixed_part_units, dp),
                final_amount: from_minor_units(share.final_units(), dp),
                rounding_adjustment: from_minor_units(share.fixed_adjustment_units(), dp),
            };

            distributed_units += share.final_units();
            total_rounding_adjustment_units += share.fixed_adjustment_units();

            if let Some(accumulator) = accumulators.get_mut(&apartment.id) {
                accumulator.total_adjustments_units += share.fixed_adjustment_units();
                accumulator.heating = Some(breakdown);
            }
        }

        total_distributed_units += distributed_units;
        category_totals
            .entry(representative.category_id)
            .or_insert_with(|| CategoryAccumulator::new(representative))
            .record(amount_units, distributed_units, heating_targets.iter().map(|a| a.id));
    }

    let mut reserve_fund_summary = None;
    if !input.reserve_operations.is_empty() {
        let outcome = distribute_reserve_operations(
            &active_apartments,
            &input.reserve_operations,
            input.settings.reserve_fund_distribution,
            dp,
            strategy,
        )?;

        for apartment in &active_apartments {
            let share = outcome.per_apartment.get(&apartment.id).copied().unwrap_or_default();
            let breakdown = ReserveFundBreakdown {
                contributions: from_minor_units(share.contributions_units, dp),
                withdrawals: from_minor_units(share.withdrawals_units, dp),
                final_amount: from_minor_units(share.final_units(), dp),
                rounding_adjustment: from_minor_units(share.adjustment_units, dp),
            };

            total_rounding_adjustment_units += share.adjustment_units;

            if let Some(accumulator) = accumulators.get_mut(&apartment.id) {
                accumulator.total_adjustments_units += share.adjustment_units;
                accumulator.reserve_fund = Some(breakdown);
            }
        }

        let previous_balance = input.reserve_previous_balance;
        let total_contributions = from_minor_units(outcome.total_contributions_units, dp);
        let total_withdrawals = from_minor_units(outcome.total_withdrawals_units, dp);
        reserve_fund_summary = Some(ReserveFundSummary {
            previous_balance,
            total_contributions,
            total_withdrawals,
            new_balance: previous_balance + total_contributions - total_withdrawals,
        });
    }

    let mut apartment_charges: Vec<ApartmentCharge> = accumulators
        .into_values()
        .map(|accumulator| accumulator.into_charge(dp))
        .collect();
    apartment_charges.sort_by_key(|charge| charge.apartment_id);

    let mut category_summaries: Vec<CategorySummary> = category_totals
        .into_values()
        .map(|category| category.into_summary(dp))
        .collect();
    category_summaries.sort_by_key(|summary| summary.category_id);

    let total_expenses = from_minor_units(total_expenses_units, dp);
    let total_distributed = from_minor_units(total_distributed_units, dp);

    let output = CalculationOutput {
        metadata: OutputMetadata {
            timestamp: input.timestamp,
            period_id: input.period_id,
            building_id: input.building_id,
            period_month: input.period_month,
            period_year: input.period_year,
            settings: input.settings,
            input_hash: input_hash(input),
            calculation_version: CALCULATION_VERSION.to_string(),
        },
        apartment_charges,
        category_summaries,
        reserve_fund_summary,
        total_expenses,
        total_distributed,
        distribution_variance: (total_distributed - total_expenses).abs(),
        total_rounding_adjustments: from_minor_units(total_rounding_adjustment_units, dp),
        validation_errors: Vec::new(),
        warnings,
    };

    Ok(output)
}
