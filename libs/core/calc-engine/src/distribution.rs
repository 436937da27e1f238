//! [libs/core/calc-engine/src/distribution.rs]
//! Per-apartment weight tables for the generic distribution methods.
//! `ConsumptionBased` is not handled here — it is heating-specific and
//! lives in `heating.rs`. Each arm is a pure function
//! `(targets, custom) -> Map<apartment_id, weight>`; dispatch is a
//! `match`, no trait objects, no registry.

use std::collections::HashMap;

use charges_domain_models::{Apartment, CoreError, DistributionMethod};
use uuid::Uuid;

/// Apartments eligible for a given expense: active, and included by
/// `included_apartment_ids` when that list is present.
pub fn active_targets<'a>(
    apartments: &'a [Apartment],
    included_apartment_ids: Option<&[Uuid]>,
) -> Vec<&'a Apartment> {
    apartments
        .iter()
        .filter(|apartment| apartment.is_active())
        .filter(|apartment| {
            included_apartment_ids
                .map(|ids| ids.contains(&apartment.id))
                .unwrap_or(true)
        })
        .collect()
}

/// Builds the weight table for one expense. Returns an empty map (not
/// an error) when `targets` is empty — per §4.1 that is a warning, not
/// a failure, and the expense contributes €0.
pub fn compute_weights(
    method: DistributionMethod,
    expense_id: Uuid,
    targets: &[&Apartment],
    custom_distribution: Option<&HashMap<Uuid, f64>>,
) -> Result<HashMap<Uuid, f64>, CoreError> {
    match method {
        DistributionMethod::GeneralShare => Ok(targets
            .iter()
            .map(|apartment| (apartment.id, apartment.share_general))
            .collect()),

        DistributionMethod::HeatingShare => Ok(targets
            .iter()
            .filter(|apartment| apartment.share_heating > 0.0)
            .map(|apartment| (apartment.id, apartment.share_heating))
            .collect()),

        DistributionMethod::EqualSplit => {
            if targets.is_empty() {
                return Ok(HashMap::new());
            }
            let weight = 1.0 / targets.len() as f64;
            Ok(targets.iter().map(|apartment| (apartment.id, weight)).collect())
        }

        DistributionMethod::Custom => {
            let custom = custom_distribution.ok_or_else(|| {
                CoreError::InvalidCustomDistribution {
                    expense_id,
                    actual_sum: 0.0,
                }
            })?;
            let target_ids: std::collections::HashSet<Uuid> =
                targets.iter().map(|apartment| apartment.id).collect();
            let weights: HashMap<Uuid, f64> = custom
                .iter()
                .filter(|(id, _)| target_ids.contains(id))
                .map(|(id, pct)| (*id, *pct))
                .collect();
            let sum: f64 = weights.values().sum();
            if (sum - 100.0).abs() > 0.01 {
                return Err(CoreError::InvalidCustomDistribution {
                    expense_id,
                    actual_sum: sum,
                });
            }
            Ok(weights)
        }

        DistributionMethod::ConsumptionBased => {
            // Handled by `heating::distribute_heating`; never reached
            // through the generic dispatch path.
            Ok(HashMap::new())
        }
    }
}
