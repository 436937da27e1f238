//! [libs/core/calc-engine/src/heating.rs]
//! The consumption-based heating algorithm (§4.1). Triggered when the
//! period has any heating consumption records alongside a single
//! `ConsumptionBased` expense with total `T`.

use std::collections::HashMap;

use charges_domain_models::{Apartment, HeatingConsumption, RoundingStrategy};
use uuid::Uuid;

use crate::money::to_minor_units;
use crate::reconciliation::distribute_and_reconcile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatingShare {
    pub variable_cost_units: i64,
    pub fixed_part_calculated_units: i64,
    pub fixed_part_units: i64,
}

impl HeatingShare {
    pub fn final_units(&self) -> i64 {
        self.variable_cost_units + self.fixed_part_units
    }

    pub fn fixed_adjustment_units(&self) -> i64 {
        self.fixed_part_units - self.fixed_part_calculated_units
    }
}

pub struct HeatingOutcome {
    pub per_apartment: HashMap<Uuid, HeatingShare>,
    pub fixed_units: i64,
    pub warnings: Vec<String>,
}

/// Apartments ordered by id — the canonical, permutation-independent
/// iteration order every reconciliation call uses, so that permuting
/// the caller's `apartments`/`expenses` arrays can never change which
/// apartment absorbs a rounding residual (spec §8 invariant 8).
pub fn canonical_order(apartments: &[&Apartment]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = apartments.iter().map(|a| a.id).collect();
    ids.sort();
    ids
}

pub fn distribute_heating(
    active_apartments: &[&Apartment],
    consumptions: &[HeatingConsumption],
    total_heating_amount_units: i64,
    decimal_places: u32,
    strategy: RoundingStrategy,
) -> HeatingOutcome {
    let mut warnings = Vec::new();
    let active_ids: std::collections::HashSet<Uuid> =
        active_apartments.iter().map(|a| a.id).collect();

    let mut variable_cost_units: HashMap<Uuid, i64> = HashMap::new();
    let mut total_variable_units: i64 = 0;

    for consumption in consumptions {
        if !active_ids.contains(&consumption.apartment_id) {
            warnings.push(format!(
                "heating consumption for apartment {} ignored: apartment is not active",
                consumption.apartment_id
            ));
            continue;
        }
        let cost_units = to_minor_units(consumption.consumption * consumption.unit_price, decimal_places);
        *variable_cost_units.entry(consumption.apartment_id).or_insert(0) += cost_units;
        total_variable_units += cost_units;
    }

    let fixed_units = total_heating_amount_units - total_variable_units;
    if fixed_units < 0 {
        warnings.push(format!(
            "heating fixed cost is negative ({} minor units): consumption cost exceeds the heating expense",
            fixed_units
        ));
    }

    let heating_weight_apartments: Vec<&&Apartment> = active_apartments
        .iter()
        .filter(|apartment| apartment.share_heating > 0.0)
        .collect();
    let weights: HashMap<Uuid, f64> = heating_weight_apartments
        .iter()
        .map(|apartment| (apartment.id, apartment.share_heating))
        .collect();
    let order = canonical_order(active_apartments);

    let fixed_shares = distribute_and_reconcile(fixed_units, &weights, strategy, &order);

    let mut per_apartment = HashMap::with_capacity(active_apartments.len());
    for apartment in active_apartments {
        let variable = variable_cost_units.get(&apartment.id).copied().unwrap_or(0);
        let fixed_share = fixed_shares.get(&apartment.id);
        let fixed_calculated = fixed_share.map(|share| share.calculated_units).unwrap_or(0);
        let fixed = fixed_share.map(|share| share.final_units).unwrap_or(0);
        per_apartment.insert(
            apartment.id,
            HeatingShare {
                variable_cost_units: variable,
                fixed_part_calculated_units: fixed_calculated,
                fixed_part_units: fixed,
            },
        );
    }

    HeatingOutcome {
        per_apartment,
        fixed_units,
        warnings,
    }
}
