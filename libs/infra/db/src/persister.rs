//! [libs/infra/db/src/persister.rs]
//! The transactional bridge between a `CalculationOutput` and durable
//! storage (§4.2). Every mutating operation is one libSQL transaction:
//! all statements commit together, or the transaction drops unsent and
//! none do.

use chrono::Utc;
use libsql::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use charges_domain_models::{
    AuditAction, AuditRecord, CalculationOutput, ChargeLine, CoreError, Period,
};

use crate::client::ChargesDbClient;
use crate::repositories::{AuditRepository, ChargeLineRepository, PeriodRepository};

pub struct Persister {
    client: ChargesDbClient,
}

impl Persister {
    pub fn new(client: ChargesDbClient) -> Self {
        Self { client }
    }

    /// The underlying database client, for callers that need to seed or
    /// inspect rows this crate has no repository for (e.g. inserting a
    /// period row, which belongs to the external collaborator in
    /// production but to the test harness in tests).
    pub fn client(&self) -> &ChargesDbClient {
        &self.client
    }

    fn connection(&self) -> Result<Connection, CoreError> {
        self.client.connection().map_err(CoreError::from)
    }

    /// The period row itself is core-owned state (§6), unlike the
    /// apartments/expenses the Orchestrator reads from its external
    /// storage collaborator.
    pub async fn find_period(&self, period_id: Uuid) -> Result<Option<Period>, CoreError> {
        let connection = self.connection()?;
        PeriodRepository::find(&connection, period_id).await.map_err(CoreError::from)
    }

    #[instrument(skip(self, output), fields(period_id = %output.metadata.period_id))]
    pub async fn store_calculation(
        &self,
        output: &CalculationOutput,
        actor: Uuid,
        force_recalculate: bool,
    ) -> Result<(), CoreError> {
        let period_id = output.metadata.period_id;
        let connection = self.connection()?;

        let existing = PeriodRepository::find(&connection, period_id).await.map_err(CoreError::from)?;

        if let Some(period) = &existing {
            if period.is_locked && !force_recalculate {
                return Err(CoreError::PeriodLocked(period_id));
            }
        }

        let new_version = existing.as_ref().map(|p| p.version + 1).unwrap_or(1);
        let tx = connection.transaction().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;

        match &existing {
            Some(_) => {
                PeriodRepository::set_version(&tx, period_id, new_version)
                    .await
                    .map_err(CoreError::from)?;
            }
            None => {
                PeriodRepository::insert_placeholder(
                    &tx,
                    period_id,
                    output.metadata.building_id,
                    output.metadata.period_month,
                    output.metadata.period_year,
                    new_version,
                )
                .await
                .map_err(CoreError::from)?;
            }
        }

        ChargeLineRepository::delete_for_period(&tx, period_id)
            .await
            .map_err(CoreError::from)?;

        for charge in &output.apartment_charges {
            let withdrawals = charge.reserve_fund.as_ref().map(|r| r.withdrawals).unwrap_or(Decimal::ZERO);
            let line = ChargeLine {
                id: Uuid::new_v4(),
                period_id,
                apartment_id: charge.apartment_id,
                base_charge: charge.subtotal + withdrawals,
                total_charge: charge.total,
            };
            ChargeLineRepository::insert(&tx, &line).await.map_err(CoreError::from)?;
        }

        let metadata = serde_json::to_value(output)
            .map_err(|e| CoreError::StorageFailure(format!("failed to serialize calculation output: {e}")))?;

        let audit = AuditRecord {
            id: Uuid::new_v4(),
            actor_id: actor,
            action: AuditAction::Create,
            entity: "Period".to_string(),
            entity_id: period_id,
            old_value: None,
            new_value: Some(json!({ "version": new_version })),
            metadata,
            created_at: Utc::now(),
        };
        AuditRepository::append(&tx, &audit).await.map_err(CoreError::from)?;

        tx.commit().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn lock_period(&self, period_id: Uuid, actor: Uuid) -> Result<(), CoreError> {
        let connection = self.connection()?;
        let period = PeriodRepository::find(&connection, period_id)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(|| CoreError::NotFound(format!("period {period_id}")))?;

        if period.is_locked {
            return Err(CoreError::ConflictingState(format!("period {period_id} is already locked")));
        }

        let tx = connection.transaction().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        let now = Utc::now();
        PeriodRepository::set_lock(&tx, period_id, true, actor, now)
            .await
            .map_err(CoreError::from)?;

        let audit = AuditRecord {
            id: Uuid::new_v4(),
            actor_id: actor,
            action: AuditAction::Lock,
            entity: "Period".to_string(),
            entity_id: period_id,
            old_value: None,
            new_value: None,
            metadata: json!({ "locked_at": now.to_rfc3339() }),
            created_at: now,
        };
        AuditRepository::append(&tx, &audit).await.map_err(CoreError::from)?;
        tx.commit().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self, reason))]
    pub async fn unlock_period(&self, period_id: Uuid, actor: Uuid, reason: &str) -> Result<(), CoreError> {
        if reason.trim().is_empty() {
            return Err(CoreError::ValidationFailed(vec![
                "unlock reason must not be empty".to_string(),
            ]));
        }

        let connection = self.connection()?;
        let period = PeriodRepository::find(&connection, period_id)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(|| CoreError::NotFound(format!("period {period_id}")))?;

        if !period.is_locked {
            return Err(CoreError::ConflictingState(format!("period {period_id} is not locked")));
        }

        let tx = connection.transaction().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        let now = Utc::now();
        PeriodRepository::set_lock(&tx, period_id, false, actor, now)
            .await
            .map_err(CoreError::from)?;

        let audit = AuditRecord {
            id: Uuid::new_v4(),
            actor_id: actor,
            action: AuditAction::Unlock,
            entity: "Period".to_string(),
            entity_id: period_id,
            old_value: None,
            new_value: None,
            metadata: json!({ "reason": reason }),
            created_at: now,
        };
        AuditRepository::append(&tx, &audit).await.map_err(CoreError::from)?;
        tx.commit().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        Ok(())
    }

    pub async fn get_latest_calculation(&self, period_id: Uuid) -> Result<Option<AuditRecord>, CoreError> {
        let connection = self.connection()?;
        AuditRepository::latest(&connection, period_id, AuditAction::Create)
            .await
            .map_err(CoreError::from)
    }

    pub async fn get_history(&self, period_id: Uuid) -> Result<Vec<AuditRecord>, CoreError> {
        let connection = self.connection()?;
        AuditRepository::history(&connection, period_id).await.map_err(CoreError::from)
    }

    /// Compares `new_input_hash` against the hash stored in the latest
    /// `CREATE` audit, answering "does recomputing yield bit-identical
    /// results?".
    pub async fn verify(&self, period_id: Uuid, new_input_hash: &str) -> Result<(bool, String), CoreError> {
        let Some(latest) = self.get_latest_calculation(period_id).await? else {
            return Ok((false, "no prior calculation to verify against".to_string()));
        };

        let stored_hash = latest
            .metadata
            .get("metadata")
            .and_then(|m| m.get("input_hash"))
            .and_then(|h| h.as_str());

        match stored_hash {
            Some(hash) if hash == new_input_hash => {
                Ok((true, "recomputation is bit-identical to the stored calculation".to_string()))
            }
            Some(_) => Ok((false, "recomputation diverges from the stored calculation".to_string())),
            None => Ok((false, "stored audit record has no input_hash to compare against".to_string())),
        }
    }

    pub async fn get_apartment_charges(&self, period_id: Uuid) -> Result<Vec<ChargeLine>, CoreError> {
        let connection = self.connection()?;
        ChargeLineRepository::list_for_period(&connection, period_id)
            .await
            .map_err(CoreError::from)
    }

    #[instrument(skip(self, reason))]
    pub async fn delete_calculation(&self, period_id: Uuid, actor: Uuid, reason: &str) -> Result<(), CoreError> {
        let connection = self.connection()?;
        let period = PeriodRepository::find(&connection, period_id)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(|| CoreError::NotFound(format!("period {period_id}")))?;

        if period.is_locked {
            return Err(CoreError::PeriodLocked(period_id));
        }

        let tx = connection.transaction().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        ChargeLineRepository::delete_for_period(&tx, period_id)
            .await
            .map_err(CoreError::from)?;

        let audit = AuditRecord {
            id: Uuid::new_v4(),
            actor_id: actor,
            action: AuditAction::Delete,
            entity: "Period".to_string(),
            entity_id: period_id,
            old_value: None,
            new_value: None,
            metadata: json!({ "reason": reason }),
            created_at: Utc::now(),
        };
        AuditRepository::append(&tx, &audit).await.map_err(CoreError::from)?;
        tx.commit().await.map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        Ok(())
    }
}
