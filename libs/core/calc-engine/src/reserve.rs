//! [libs/core/calc-engine/src/reserve.rs]
//! Reserve-fund contributions and withdrawals (§4.1). Contributions are
//! treated as a synthetic "Reserve" expense and reconciled the same way
//! any other expense is; withdrawals are distributed identically but
//! subtracted.

use std::collections::HashMap;

use charges_domain_models::{
    Apartment, CoreError, DistributionMethod, ReserveFundOperation, ReserveOperationType,
    RoundingStrategy,
};
use uuid::Uuid;

use crate::distribution::compute_weights;
use crate::heating::canonical_order;
use crate::money::to_minor_units;
use crate::reconciliation::distribute_and_reconcile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReserveShare {
    pub contributions_units: i64,
    pub withdrawals_units: i64,
    /// Signed sum of every reconciliation adjustment this apartment
    /// absorbed across all reserve operations: positive for
    /// contributions, negative for withdrawals (a withdrawal rounded up
    /// subtracts more from the apartment's total, not less).
    pub adjustment_units: i64,
}

impl ReserveShare {
    pub fn final_units(&self) -> i64 {
        self.contributions_units - self.withdrawals_units
    }
}

pub struct ReserveOutcome {
    pub per_apartment: HashMap<Uuid, ReserveShare>,
    pub total_contributions_units: i64,
    pub total_withdrawals_units: i64,
}

pub fn distribute_reserve_operations(
    active_apartments: &[&Apartment],
    operations: &[ReserveFundOperation],
    default_method: DistributionMethod,
    decimal_places: u32,
    strategy: RoundingStrategy,
) -> Result<ReserveOutcome, CoreError> {
    let order = canonical_order(active_apartments);
    let mut per_apartment: HashMap<Uuid, ReserveShare> = HashMap::new();
    let mut total_contributions_units = 0i64;
    let mut total_withdrawals_units = 0i64;

    for (index, operation) in operations.iter().enumerate() {
        let method = operation.distribution_method.unwrap_or(default_method);
        let synthetic_expense_id = Uuid::nil().with_counter(index);
        let weights = compute_weights(method, synthetic_expense_id, active_apartments, None)?;
        let amount_units = to_minor_units(operation.amount, decimal_places);
        let shares = distribute_and_reconcile(amount_units, &weights, strategy, &order);

        match operation.operation_type {
            ReserveOperationType::Contribution => {
                total_contributions_units += amount_units;
                for (apartment_id, share) in shares {
                    let entry = per_apartment.entry(apartment_id).or_default();
                    entry.contributions_units += share.final_units;
                    entry.adjustment_units += share.adjustment_units();
                }
            }
            ReserveOperationType::Withdrawal => {
                total_withdrawals_units += amount_units;
                for (apartment_id, share) in shares {
                    let entry = per_apartment.entry(apartment_id).or_default();
                    entry.withdrawals_units += share.final_units;
                    entry.adjustment_units -= share.adjustment_units();
                }
            }
        }
    }

    Ok(ReserveOutcome {
        per_apartment,
        total_contributions_units,
        total_withdrawals_units,
    })
}

/// Small helper so each reserve operation gets a stable synthetic id
/// for error reporting without requiring the caller to assign one.
trait NilWithCounter {
    fn with_counter(self, counter: usize) -> Uuid;
}

impl NilWithCounter for Uuid {
    fn with_counter(self, counter: usize) -> Uuid {
        let mut bytes = *self.as_bytes();
        bytes[15] = counter as u8;
        Uuid::from_bytes(bytes)
    }
}
