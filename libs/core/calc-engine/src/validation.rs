//! [libs/core/calc-engine/src/validation.rs]
//! Fail-fast validation (§4.1). Either `calculate` returns a complete
//! output, or it fails with `ValidationFailed` carrying every error —
//! never a partial result.

use charges_domain_models::CalculationInput;
use uuid::Uuid;

/// Returns every validation error found; an empty `Vec` means the
/// input is valid enough to proceed to calculation.
pub fn validate(input: &CalculationInput) -> Vec<String> {
    let mut errors = Vec::new();

    if input.period_id == Uuid::nil() {
        errors.push("period_id is missing".to_string());
    }

    if input.apartments.is_empty() {
        errors.push("apartments must not be empty".to_string());
    }

    if input.expenses.is_empty() {
        errors.push("expenses must not be empty".to_string());
    }

    let active_general_share_total: f64 = input
        .apartments
        .iter()
        .filter(|apartment| apartment.is_active())
        .map(|apartment| apartment.share_general)
        .sum();
    if !input.apartments.is_empty() && active_general_share_total == 0.0 {
        errors.push("active apartments' total general share is zero".to_string());
    }

    for expense in &input.expenses {
        if expense.amount <= rust_decimal::Decimal::ZERO {
            errors.push(format!(
                "expense {} has non-positive amount {}",
                expense.id, expense.amount
            ));
        }
    }

    errors
}
