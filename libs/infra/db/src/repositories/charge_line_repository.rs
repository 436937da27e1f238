//! [libs/infra/db/src/repositories/charge_line_repository.rs]
//! Per-(period, apartment) charge lines. Wholesale destroy-and-recreate
//! on every successful calculate, per §4.2 — never a partial update.

use libsql::{params, Connection, Transaction};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use charges_domain_models::ChargeLine;

use crate::errors::DbError;

pub struct ChargeLineRepository;

impl ChargeLineRepository {
    pub async fn delete_for_period(tx: &Transaction, period_id: Uuid) -> Result<(), DbError> {
        tx.execute(
            "DELETE FROM charge_lines WHERE period_id = ?1",
            params![period_id.to_string()],
        )
        .await?;
        Ok(())
    }

    pub async fn insert(tx: &Transaction, line: &ChargeLine) -> Result<(), DbError> {
        tx.execute(
            "INSERT INTO charge_lines (id, period_id, apartment_id, base_charge, total_charge)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                line.id.to_string(),
                line.period_id.to_string(),
                line.apartment_id.to_string(),
                line.base_charge.to_string(),
                line.total_charge.to_string(),
            ],
        )
        .await?;
        Ok(())
    }

    pub async fn list_for_period(
        connection: &Connection,
        period_id: Uuid,
    ) -> Result<Vec<ChargeLine>, DbError> {
        let mut rows = connection
            .query(
                "SELECT id, period_id, apartment_id, base_charge, total_charge
                 FROM charge_lines WHERE period_id = ?1",
                params![period_id.to_string()],
            )
            .await?;

        let mut lines = Vec::new();
        while let Some(row) = rows.next().await? {
            let parse_uuid =
                |s: String| Uuid::parse_str(&s).map_err(|e| DbError::MappingError(e.to_string()));
            let parse_decimal =
                |s: String| Decimal::from_str(&s).map_err(|e| DbError::MappingError(e.to_string()));

            let id: String = row.get(0).map_err(|e| DbError::MappingError(e.to_string()))?;
            let period_id: String = row.get(1).map_err(|e| DbError::MappingError(e.to_string()))?;
            let apartment_id: String = row.get(2).map_err(|e| DbError::MappingError(e.to_string()))?;
            let base_charge: String = row.get(3).map_err(|e| DbError::MappingError(e.to_string()))?;
            let total_charge: String = row.get(4).map_err(|e| DbError::MappingError(e.to_string()))?;

            lines.push(ChargeLine {
                id: parse_uuid(id)?,
                period_id: parse_uuid(period_id)?,
                apartment_id: parse_uuid(apartment_id)?,
                base_charge: parse_decimal(base_charge)?,
                total_charge: parse_decimal(total_charge)?,
            });
        }
        Ok(lines)
    }
}
