//! [apps/orchestrator/src/data_source.rs]
//! The Orchestrator's one port onto the external storage collaborator
//! (§6): everything this crate reads that isn't already owned by the
//! pure Calculator or the libSQL Persister. Structural CRUD for
//! buildings/apartments/expenses is explicitly out of scope (§1); this
//! trait only names the read shape the Orchestrator depends on, so it
//! can be driven in tests without a real database.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use charges_domain_models::{
    Apartment, CalculationSettings, ExpenseItem, HeatingConsumption, Period, ReserveFundOperation,
};

#[async_trait]
pub trait BuildingDataSource: Send + Sync {
    async fn find_period(&self, period_id: Uuid) -> anyhow::Result<Option<Period>>;

    /// Non-deleted apartments belonging to `building_id`, active and
    /// excluded alike — exclusion is a calculator-level concept, not a
    /// storage-level filter.
    async fn list_apartments(&self, building_id: Uuid) -> anyhow::Result<Vec<Apartment>>;

    /// Non-deleted expenses for `building_id` whose date falls within
    /// `[start_date, end_date]`, category already joined.
    async fn list_expenses(
        &self,
        building_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<Vec<ExpenseItem>>;

    /// Empty when the period carries no heating consumption records.
    async fn list_heating_consumptions(&self, period_id: Uuid) -> anyhow::Result<Vec<HeatingConsumption>>;

    /// Empty when the period has no reserve fund activity.
    async fn list_reserve_operations(&self, period_id: Uuid) -> anyhow::Result<Vec<ReserveFundOperation>>;

    /// The reserve fund balance carried in from the previous period.
    /// Never fabricated by the Orchestrator (SPEC_FULL.md Open
    /// Questions) — a data source with no ledger yet should return
    /// `Decimal::ZERO` explicitly rather than the Orchestrator guessing.
    async fn reserve_previous_balance(&self, building_id: Uuid, period_id: Uuid) -> anyhow::Result<Decimal>;

    /// The building's configured calculation settings, or a sensible
    /// default if the building has never customized them.
    async fn calculation_settings(&self, building_id: Uuid) -> anyhow::Result<CalculationSettings>;
}
