//! [libs/core/calc-engine/src/hashing.rs]
//! Stable SHA-256 input hash (§4.1). Only the semantically relevant
//! input fields are hashed; canonical JSON (sorted keys, fixed number
//! format, no whitespace) keeps the hash stable across runtimes and
//! across permutations of the input arrays.

use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use charges_domain_models::{CalculationInput, CalculationSettings, DistributionMethod};

#[derive(Serialize)]
struct CanonicalExpense {
    id: Uuid,
    amount: Decimal,
    category_id: Uuid,
    distribution_method: DistributionMethod,
}

#[derive(Serialize)]
struct CanonicalApartment {
    id: Uuid,
    share_general: f64,
    share_heating: f64,
    is_excluded: bool,
}

#[derive(Serialize)]
struct CanonicalInput {
    period_id: Uuid,
    expenses: Vec<CanonicalExpense>,
    apartments: Vec<CanonicalApartment>,
    settings: CalculationSettings,
}

/// Hashes the semantically relevant subset of `input`. The returned
/// string is deterministic: identical subsets hash identically
/// regardless of the order apartments/expenses arrive in, because both
/// arrays are sorted by id before serialization, and `serde_json`
/// serializes object keys in sorted (`BTreeMap`) order by default.
pub fn input_hash(input: &CalculationInput) -> String {
    let mut expenses: Vec<CanonicalExpense> = input
        .expenses
        .iter()
        .map(|expense| CanonicalExpense {
            id: expense.id,
            amount: expense.amount,
            category_id: expense.category_id,
            distribution_method: expense.distribution_method,
        })
        .collect();
    expenses.sort_by_key(|expense| expense.id);

    let mut apartments: Vec<CanonicalApartment> = input
        .apartments
        .iter()
        .map(|apartment| CanonicalApartment {
            id: apartment.id,
            share_general: apartment.share_general,
            share_heating: apartment.share_heating,
            is_excluded: apartment.is_excluded,
        })
        .collect();
    apartments.sort_by_key(|apartment| apartment.id);

    let canonical = CanonicalInput {
        period_id: input.period_id,
        expenses,
        apartments,
        settings: input.settings,
    };

    let value = serde_json::to_value(&canonical).expect("canonical input is always serializable");
    let canonical_bytes = serde_json::to_vec(&value).expect("canonical value is always serializable");

    let mut hasher = Sha256::new();
    hasher.update(&canonical_bytes);
    hex::encode(hasher.finalize())
}
