//! [apps/orchestrator/src/orchestrator.rs]
//! Loads entities for a period, assembles a `CalculationInput`, drives
//! the Calculator, and hands the result to the Persister (§4.3).

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use charges_core_calc::calculate;
use charges_domain_models::{AuditRecord, CalculationOutput, ChargeLine, CoreError, Period};
use charges_infra_db::Persister;

use crate::data_source::BuildingDataSource;
use crate::errors::OrchestratorError;
use crate::input_builder::build_input;
use crate::options::CalculateOptions;

pub struct Orchestrator<D: BuildingDataSource> {
    data_source: D,
    persister: Persister,
}

impl<D: BuildingDataSource> Orchestrator<D> {
    pub fn new(data_source: D, persister: Persister) -> Self {
        Self { data_source, persister }
    }

    /// Loads, computes, and persists. On a locked period without
    /// `force_recalculate`, returns the cached output unchanged and
    /// writes nothing (Scenario F).
    #[instrument(skip(self, options), fields(period_id = %period_id))]
    pub async fn calculate_period(
        &self,
        period_id: Uuid,
        actor: Uuid,
        options: &CalculateOptions,
        timestamp: DateTime<Utc>,
    ) -> Result<CalculationOutput, OrchestratorError> {
        let period = self.load_period(period_id).await?;

        if period.is_locked && !options.force_recalculate {
            return match self.persister.get_latest_calculation(period_id).await? {
                Some(record) => decode_cached_output(&record, period_id),
                None => Err(CoreError::PeriodLocked(period_id).into()),
            };
        }

        let output = self.build_and_calculate(&period, options, timestamp).await?;
        self.persister
            .store_calculation(&output, actor, options.force_recalculate)
            .await?;
        Ok(output)
    }

    /// Same input assembly, Calculator only — never touches the
    /// Persister, so it is safe to call on a locked period.
    #[instrument(skip(self, options), fields(period_id = %period_id))]
    pub async fn preview_period(
        &self,
        period_id: Uuid,
        options: &CalculateOptions,
        timestamp: DateTime<Utc>,
    ) -> Result<CalculationOutput, OrchestratorError> {
        let period = self.load_period(period_id).await?;
        self.build_and_calculate(&period, options, timestamp).await
    }

    pub async fn lock_period(&self, period_id: Uuid, actor: Uuid) -> Result<(), OrchestratorError> {
        self.persister.lock_period(period_id, actor).await.map_err(Into::into)
    }

    pub async fn unlock_period(
        &self,
        period_id: Uuid,
        actor: Uuid,
        reason: &str,
    ) -> Result<(), OrchestratorError> {
        self.persister
            .unlock_period(period_id, actor, reason)
            .await
            .map_err(Into::into)
    }

    pub async fn get_history(&self, period_id: Uuid) -> Result<Vec<AuditRecord>, OrchestratorError> {
        self.persister.get_history(period_id).await.map_err(Into::into)
    }

    pub async fn get_apartment_charges(&self, period_id: Uuid) -> Result<Vec<ChargeLine>, OrchestratorError> {
        self.persister.get_apartment_charges(period_id).await.map_err(Into::into)
    }

    async fn load_period(&self, period_id: Uuid) -> Result<Period, OrchestratorError> {
        self.data_source
            .find_period(period_id)
            .await?
            .ok_or_else(|| OrchestratorError::from(CoreError::NotFound(format!("period {period_id}"))))
    }

    async fn build_and_calculate(
        &self,
        period: &Period,
        options: &CalculateOptions,
        timestamp: DateTime<Utc>,
    ) -> Result<CalculationOutput, OrchestratorError> {
        let building_id = period.building_id;

        let apartments = self.data_source.list_apartments(building_id).await?;
        let expenses = self
            .data_source
            .list_expenses(building_id, period.start_date, period.end_date)
            .await?;
        let heating_consumptions = self.data_source.list_heating_consumptions(period.id).await?;
        let reserve_operations = self.data_source.list_reserve_operations(period.id).await?;
        let reserve_previous_balance = self
            .data_source
            .reserve_previous_balance(building_id, period.id)
            .await?;
        let settings = self.data_source.calculation_settings(building_id).await?;

        let input = build_input(
            period,
            apartments,
            expenses,
            heating_consumptions,
            reserve_operations,
            reserve_previous_balance,
            settings,
            options,
            timestamp,
        );

        calculate(&input).map_err(Into::into)
    }
}

/// A stored `CREATE` audit holds the entire `CalculationOutput` as its
/// `metadata` (see `charges_infra_db::persister::store_calculation`).
fn decode_cached_output(
    record: &AuditRecord,
    period_id: Uuid,
) -> Result<CalculationOutput, OrchestratorError> {
    serde_json::from_value(record.metadata.clone()).map_err(|_| OrchestratorError::CorruptCache(period_id))
}
