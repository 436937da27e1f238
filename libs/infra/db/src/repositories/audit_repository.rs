//! [libs/infra/db/src/repositories/audit_repository.rs]
//! Append-only audit trail. Entries are never updated or deleted — they
//! outlive the entities they reference (§3 Ownership summary).

use chrono::{DateTime, Utc};
use libsql::{params, Connection, Transaction};
use serde_json::Value;
use uuid::Uuid;

use charges_domain_models::{AuditAction, AuditRecord};

use crate::errors::DbError;

pub struct AuditRepository;

impl AuditRepository {
    pub async fn append(tx: &Transaction, record: &AuditRecord) -> Result<(), DbError> {
        tx.execute(
            "INSERT INTO audit_records (id, actor_id, action, entity, entity_id, old_value, new_value, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.to_string(),
                record.actor_id.to_string(),
                action_to_str(record.action).to_string(),
                record.entity.clone(),
                record.entity_id.to_string(),
                record.old_value.as_ref().map(|v| v.to_string()),
                record.new_value.as_ref().map(|v| v.to_string()),
                record.metadata.to_string(),
                record.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    pub async fn latest(
        connection: &Connection,
        entity_id: Uuid,
        action: AuditAction,
    ) -> Result<Option<AuditRecord>, DbError> {
        let mut rows = connection
            .query(
                "SELECT id, actor_id, action, entity, entity_id, old_value, new_value, metadata, created_at
                 FROM audit_records WHERE entity_id = ?1 AND action = ?2
                 ORDER BY created_at DESC LIMIT 1",
                params![entity_id.to_string(), action_to_str(action).to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_record(&row)?)),
            None => Ok(None),
        }
    }

    /// Lock/unlock/create/update audits in reverse-chronological order;
    /// deletions are excluded per §4.2 `get_history`.
    pub async fn history(connection: &Connection, entity_id: Uuid) -> Result<Vec<AuditRecord>, DbError> {
        let mut rows = connection
            .query(
                "SELECT id, actor_id, action, entity, entity_id, old_value, new_value, metadata, created_at
                 FROM audit_records WHERE entity_id = ?1 AND action != 'delete'
                 ORDER BY created_at DESC",
                params![entity_id.to_string()],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(map_record(&row)?);
        }
        Ok(records)
    }
}

fn action_to_str(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Create => "create",
        AuditAction::Update => "update",
        AuditAction::Lock => "lock",
        AuditAction::Unlock => "unlock",
        AuditAction::Delete => "delete",
    }
}

fn str_to_action(value: &str) -> Result<AuditAction, DbError> {
    match value {
        "create" => Ok(AuditAction::Create),
        "update" => Ok(AuditAction::Update),
        "lock" => Ok(AuditAction::Lock),
        "unlock" => Ok(AuditAction::Unlock),
        "delete" => Ok(AuditAction::Delete),
        other => Err(DbError::MappingError(format!("unknown audit action: {other}"))),
    }
}

fn map_record(row: &libsql::Row) -> Result<AuditRecord, DbError> {
    let parse_uuid = |s: String| Uuid::parse_str(&s).map_err(|e| DbError::MappingError(e.to_string()));
    let parse_json = |s: Option<String>| -> Result<Option<Value>, DbError> {
        s.map(|s| serde_json::from_str(&s).map_err(|e| DbError::MappingError(e.to_string())))
            .transpose()
    };

    let id: String = row.get(0).map_err(|e| DbError::MappingError(e.to_string()))?;
    let actor_id: String = row.get(1).map_err(|e| DbError::MappingError(e.to_string()))?;
    let action: String = row.get(2).map_err(|e| DbError::MappingError(e.to_string()))?;
    let entity: String = row.get(3).map_err(|e| DbError::MappingError(e.to_string()))?;
    let entity_id: String = row.get(4).map_err(|e| DbError::MappingError(e.to_string()))?;
    let old_value: Option<String> = row.get(5).map_err(|e| DbError::MappingError(e.to_string()))?;
    let new_value: Option<String> = row.get(6).map_err(|e| DbError::MappingError(e.to_string()))?;
    let metadata: String = row.get(7).map_err(|e| DbError::MappingError(e.to_string()))?;
    let created_at: String = row.get(8).map_err(|e| DbError::MappingError(e.to_string()))?;

    Ok(AuditRecord {
        id: parse_uuid(id)?,
        actor_id: parse_uuid(actor_id)?,
        action: str_to_action(&action)?,
        entity,
        entity_id: parse_uuid(entity_id)?,
        old_value: parse_json(old_value)?,
        new_value: parse_json(new_value)?,
        metadata: serde_json::from_str(&metadata).map_err(|e| DbError::MappingError(e.to_string()))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DbError::MappingError(e.to_string()))?,
    })
}
