//! [libs/domain/models/src/error.rs]
//! The error taxonomy shared by the Calculator, the Persister, and the
//! Orchestrator (§7). One enum, matched once, regardless of which layer
//! raised it.
//!
//! `ConsumptionDataInconsistent` (§7) is deliberately absent here — the
//! spec treats it as a warning on a successful `CalculationOutput`, not
//! a failure value, so it never appears in a `Result::Err`.

use uuid::Uuid;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A referenced period/apartment/expense does not exist or is
    /// soft-deleted.
    #[error("not found: {0}")]
    NotFound(String),

    /// A mutating operation was attempted on a locked period.
    #[error("period {0} is locked")]
    PeriodLocked(Uuid),

    /// Input failed §4.1 validation; carries the full list, never a
    /// partial result.
    #[error("validation failed: {0:?}")]
    ValidationFailed(Vec<String>),

    /// A `Custom` distribution's percentages did not sum to 100 ± 0.01.
    #[error("custom distribution for expense {expense_id} sums to {actual_sum}, expected 100")]
    InvalidCustomDistribution { expense_id: Uuid, actual_sum: f64 },

    /// e.g. lock-already-locked, unlock-not-locked.
    #[error("conflicting state: {0}")]
    ConflictingState(String),

    /// The storage transaction aborted; the whole operation rolled
    /// back. Safe to retry with the same input — retrying yields the
    /// same `input_hash`.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}
