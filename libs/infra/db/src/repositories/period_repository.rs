//! [libs/infra/db/src/repositories/period_repository.rs]
//! Reads and lock/version mutations on the `periods` table. Structural
//! period CRUD (creating a brand new period row) is the external
//! collaborator's job; this repository only ever finds or updates one.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use libsql::{params, Connection, Transaction};
use uuid::Uuid;

use charges_domain_models::Period;

use crate::errors::DbError;

pub struct PeriodRepository;

impl PeriodRepository {
    pub async fn find(connection: &Connection, period_id: Uuid) -> Result<Option<Period>, DbError> {
        let mut rows = connection
            .query(
                "SELECT id, building_id, name, start_date, end_date, due_date, is_locked, locked_at, locked_by, version
                 FROM periods WHERE id = ?1",
                params![period_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_period(&row)?)),
            None => Ok(None),
        }
    }

    /// Sets `version` to `new_version` and refreshes `updated_at`. The
    /// caller reads the current version beforehand (inside the same
    /// logical operation, before the transaction opens) and passes
    /// `current_version + 1` — libSQL's `RETURNING` support varies by
    /// build, so this stays a plain `UPDATE ... WHERE`.
    pub async fn set_version(tx: &Transaction, period_id: Uuid, new_version: u32) -> Result<(), DbError> {
        let rows_affected = tx
            .execute(
                "UPDATE periods SET version = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![period_id.to_string(), new_version as i64],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::PeriodNotFound(period_id));
        }
        Ok(())
    }

    /// Inserts a brand-new period row with a synthetic name/date range
    /// derived from `month`/`year`, unlocked, at `version`. §4.2 step 2
    /// calls for an upsert, but the first calculate against a period the
    /// Persister has never stored a row for (its own `periods` table is
    /// separate bookkeeping from the external collaborator's authoritative
    /// record, §1) has nothing else to insert from — this is the
    /// placeholder the next `find` reconciles against once that
    /// collaborator's own row lands here too.
    pub async fn insert_placeholder(
        tx: &Transaction,
        period_id: Uuid,
        building_id: Uuid,
        month: u32,
        year: i32,
        version: u32,
    ) -> Result<(), DbError> {
        let start_date = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DbError::MappingError(format!("invalid period month/year {year}-{month}")))?;
        let end_date = last_day_of_month(start_date);

        tx.execute(
            "INSERT INTO periods (id, building_id, name, start_date, end_date, due_date, is_locked, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                period_id.to_string(),
                building_id.to_string(),
                format!("{year}-{month:02}"),
                start_date.to_string(),
                end_date.to_string(),
                end_date.to_string(),
                version as i64,
            ],
        )
        .await?;
        Ok(())
    }

    pub async fn set_lock(
        tx: &Transaction,
        period_id: Uuid,
        locked: bool,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let rows_affected = if locked {
            tx.execute(
                "UPDATE periods SET is_locked = 1, locked_at = ?2, locked_by = ?3, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![period_id.to_string(), at.to_rfc3339(), actor.to_string()],
            )
            .await?
        } else {
            tx.execute(
                "UPDATE periods SET is_locked = 0, locked_at = NULL, locked_by = NULL, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![period_id.to_string()],
            )
            .await?
        };

        if rows_affected == 0 {
            return Err(DbError::PeriodNotFound(period_id));
        }
        Ok(())
    }
}

fn map_period(row: &libsql::Row) -> Result<Period, DbError> {
    let parse_uuid = |s: String| Uuid::parse_str(&s).map_err(|e| DbError::MappingError(e.to_string()));
    let parse_date = |s: String| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| DbError::MappingError(e.to_string()))
    };

    let id: String = row.get(0).map_err(|e| DbError::MappingError(e.to_string()))?;
    let building_id: String = row.get(1).map_err(|e| DbError::MappingError(e.to_string()))?;
    let name: String = row.get(2).map_err(|e| DbError::MappingError(e.to_string()))?;
    let start_date: String = row.get(3).map_err(|e| DbError::MappingError(e.to_string()))?;
    let end_date: String = row.get(4).map_err(|e| DbError::MappingError(e.to_string()))?;
    let due_date: String = row.get(5).map_err(|e| DbError::MappingError(e.to_string()))?;
    let is_locked: i64 = row.get(6).map_err(|e| DbError::MappingError(e.to_string()))?;
    let locked_at: Option<String> = row.get(7).map_err(|e| DbError::MappingError(e.to_string()))?;
    let locked_by: Option<String> = row.get(8).map_err(|e| DbError::MappingError(e.to_string()))?;
    let version: i64 = row.get(9).map_err(|e| DbError::MappingError(e.to_string()))?;

    Ok(Period {
        id: parse_uuid(id)?,
        building_id: parse_uuid(building_id)?,
        name,
        start_date: parse_date(start_date)?,
        end_date: parse_date(end_date)?,
        due_date: parse_date(due_date)?,
        is_locked: is_locked != 0,
        locked_at: locked_at
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        locked_by: locked_by.map(parse_uuid).transpose()?,
        version: version as u32,
    })
}
