//! [apps/orchestrator/src/category_map.rs]
//! Category name → default distribution method (§4.3). Overridable
//! per-call; unknown categories fall back to `GeneralShare`.

use std::collections::HashMap;
use std::sync::LazyLock;

use charges_domain_models::DistributionMethod;

static DEFAULT_CATEGORY_METHODS: LazyLock<HashMap<&'static str, DistributionMethod>> = LazyLock::new(|| {
    use DistributionMethod::*;
    HashMap::from([
        ("CLEANING", GeneralShare),
        ("ELECTRICITY", GeneralShare),
        ("WATER", GeneralShare),
        ("MAINTENANCE", GeneralShare),
        ("INSURANCE", GeneralShare),
        ("SECURITY", GeneralShare),
        ("GARDENING", GeneralShare),
        ("ELEVATOR", GeneralShare),
        ("OTHER", GeneralShare),
        ("OIL", ConsumptionBased),
    ])
});

/// Resolves the distribution method for a category, checking the
/// caller's overrides first, then the default table, then falling back
/// to `GeneralShare` for anything unrecognized.
pub fn resolve_method(
    category_name: &str,
    overrides: &HashMap<String, DistributionMethod>,
) -> DistributionMethod {
    let key = category_name.trim().to_uppercase();

    if let Some(method) = overrides.get(&key).or_else(|| overrides.get(category_name)) {
        return *method;
    }

    DEFAULT_CATEGORY_METHODS
        .get(key.as_str())
        .copied()
        .unwrap_or(DistributionMethod::GeneralShare)
}
