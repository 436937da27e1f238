//! [libs/core/calc-engine/src/reconciliation.rs]
//! Rounding reconciliation — the "conservation of money" invariant.
//! After independently rounding each target's share, the sum almost
//! always differs from the distributed amount by at most `k` minor
//! units (`k` = number of targets). This module redistributes that
//! residual so the sum matches exactly.

use std::collections::HashMap;

use charges_domain_models::RoundingStrategy;
use uuid::Uuid;

/// One apartment's share of a distributed amount, before and after
/// reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciledShare {
    pub calculated_units: i64,
    pub final_units: i64,
}

impl ReconciledShare {
    pub fn adjustment_units(&self) -> i64 {
        self.final_units - self.calculated_units
    }
}

fn round_half_even(value: f64) -> i64 {
    let floor = value.floor();
    let diff = value - floor;
    let floor_i = floor as i64;
    if diff < 0.5 {
        floor_i
    } else if diff > 0.5 {
        floor_i + 1
    } else if floor_i % 2 == 0 {
        floor_i
    } else {
        floor_i + 1
    }
}

/// Distributes `amount_units` across `weights` and reconciles the
/// rounding residual so the returned shares sum to exactly
/// `amount_units`. `iteration_order` fixes tie-breaking and the
/// "first apartment" / "first-seen" rules deterministically — it must
/// contain every key of `weights`, in the caller's canonical order.
pub fn distribute_and_reconcile(
    amount_units: i64,
    weights: &HashMap<Uuid, f64>,
    strategy: RoundingStrategy,
    iteration_order: &[Uuid],
) -> HashMap<Uuid, ReconciledShare> {
    if weights.is_empty() {
        return HashMap::new();
    }

    let sum_weights: f64 = weights.values().sum();
    if sum_weights <= 0.0 {
        return weights
            .keys()
            .map(|id| {
                (
                    *id,
                    ReconciledShare {
                        calculated_units: 0,
                        final_units: 0,
                    },
                )
            })
            .collect();
    }

    let ordered_ids: Vec<Uuid> = iteration_order
        .iter()
        .copied()
        .filter(|id| weights.contains_key(id))
        .collect();

    let mut calculated: HashMap<Uuid, i64> = HashMap::with_capacity(ordered_ids.len());
    for id in &ordered_ids {
        let weight = weights[id];
        let share = amount_units as f64 * weight / sum_weights;
        calculated.insert(*id, round_half_even(share));
    }

    let distributed_sum: i64 = calculated.values().sum();
    let mut residual = amount_units - distributed_sum;

    let mut final_amounts = calculated.clone();

    if residual != 0 {
        match strategy {
            RoundingStrategy::FirstApartment => {
                if let Some(first) = ordered_ids.first() {
                    *final_amounts.get_mut(first).unwrap() += residual;
                    residual = 0;
                }
            }
            RoundingStrategy::LargestShare => {
                // `Iterator::max_by` keeps the *last* maximal element on a
                // tie; the spec requires first-seen, so fold manually with
                // a strict `>` that only replaces on a strictly larger
                // weight.
                let mut largest: Option<Uuid> = None;
                let mut largest_weight = f64::NEG_INFINITY;
                for id in &ordered_ids {
                    let weight = weights[id];
                    if weight > largest_weight {
                        largest_weight = weight;
                        largest = Some(*id);
                    }
                }
                if let Some(largest) = largest {
                    *final_amounts.get_mut(&largest).unwrap() += residual;
                    residual = 0;
                }
            }
            RoundingStrategy::Distribute => {
                let mut by_weight_desc = ordered_ids.clone();
                by_weight_desc.sort_by(|a, b| {
                    weights[b]
                        .partial_cmp(&weights[a])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                let step: i64 = if residual > 0 { 1 } else { -1 };
                let mut cursor = 0usize;
                while residual != 0 && !by_weight_desc.is_empty() {
                    let id = by_weight_desc[cursor % by_weight_desc.len()];
                    *final_amounts.get_mut(&id).unwrap() += step;
                    residual -= step;
                    cursor += 1;
                }
            }
        }
    }

    ordered_ids
        .into_iter()
        .map(|id| {
            (
                id,
                ReconciledShare {
                    calculated_units: calculated[&id],
                    final_units: final_amounts[&id],
                },
            )
        })
        .collect()
}
