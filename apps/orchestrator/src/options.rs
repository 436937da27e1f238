//! [apps/orchestrator/src/options.rs]
//! Per-call overrides recognized by the Orchestrator (§6 "Configuration
//! surface: per-call overrides").

use std::collections::HashMap;

use charges_domain_models::DistributionMethod;

#[derive(Debug, Clone)]
pub struct CalculateOptions {
    /// Recalculate even if the period is locked. Without this, a
    /// `calculate_period` call on a locked period returns the cached
    /// output untouched (Scenario F).
    pub force_recalculate: bool,
    /// When `false`, heating consumption records are dropped before
    /// building the `CalculationInput`, so any `CONSUMPTION_BASED`
    /// expense degenerates to a flat fixed-cost distribution.
    pub include_heating: bool,
    /// Per-call category → method overrides, checked before the
    /// default table in `category_map`.
    pub category_overrides: HashMap<String, DistributionMethod>,
}

impl CalculateOptions {
    pub fn new() -> Self {
        Self {
            force_recalculate: false,
            include_heating: true,
            category_overrides: HashMap::new(),
        }
    }
}

impl Default for CalculateOptions {
    fn default() -> Self {
        Self::new()
    }
}
