//! [libs/core/calc-engine/src/money.rs]
//! Fixed-point money helpers. Every intermediate distribution table is
//! keyed by apartment id and built once over integer minor units
//! (`10^(-decimal_places)` each) rather than `Decimal`/`f64` directly —
//! that turns the rounding-reconciliation step into integer arithmetic
//! on a residual bounded by the number of targets, with no
//! representation drift.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Converts a `Decimal` amount into an integer count of minor units
/// (e.g. cents at `decimal_places == 2`), rounding half-to-even. This is
/// the one and only rounding rule the engine uses, documented here so
/// every caller gets the same stable behavior across runs.
pub fn to_minor_units(amount: Decimal, decimal_places: u32) -> i64 {
    let scale = Decimal::from(10i64.pow(decimal_places));
    let scaled = (amount * scale).round_dp_with_strategy(
        0,
        rust_decimal::RoundingStrategy::MidpointNearestEven,
    );
    scaled.to_i64().unwrap_or(0)
}

/// Inverse of [`to_minor_units`].
pub fn from_minor_units(units: i64, decimal_places: u32) -> Decimal {
    let scale = Decimal::from(10i64.pow(decimal_places));
    Decimal::from(units) / scale
}

/// One minor unit at the configured scale, e.g. `0.01` at `decimal_places == 2`.
pub fn one_ulp(decimal_places: u32) -> Decimal {
    from_minor_units(1, decimal_places)
}
