//! [libs/domain/models/src/lib.rs]
//! Shared DTOs and domain entities for the common-charges calculation
//! engine. Plain value types only — no I/O, no async, no business logic.
//! This crate is the single source of truth for the shapes the pure
//! Calculator, the Persister, and the Orchestrator all agree on.

pub mod apartment;
pub mod audit;
pub mod charge_line;
pub mod error;
pub mod expense;
pub mod heating;
pub mod input;
pub mod output;
pub mod period;
pub mod reserve;
pub mod settings;

pub use apartment::Apartment;
pub use audit::{AuditAction, AuditRecord};
pub use charge_line::ChargeLine;
pub use error::CoreError;
pub use expense::{DistributionMethod, ExpenseItem};
pub use heating::HeatingConsumption;
pub use input::CalculationInput;
pub use output::{
    ApartmentCharge, CalculationOutput, CategorySummary, ExpenseBreakdownItem,
    HeatingBreakdown, OutputMetadata, ReserveFundBreakdown, ReserveFundSummary,
    CALCULATION_VERSION,
};
pub use period::{Period, PeriodStatus};
pub use reserve::{ReserveFundOperation, ReserveOperationType};
pub use settings::{CalculationSettings, RoundingStrategy};
