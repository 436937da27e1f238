//! [libs/infra/db/src/schema.rs]
//! Logical schema (§6 Persisted State Layout): `periods`, `charge_lines`,
//! `audit_records`. Nothing else — the building/apartment/expense CRUD
//! this reads its input from is an external collaborator, out of scope.

use libsql::Connection;
use tracing::{debug, instrument};

use crate::errors::DbError;

const SCHEMA_STATEMENTS: &[(&str, &str)] = &[
    (
        "periods",
        r#"
        CREATE TABLE IF NOT EXISTS periods (
            id TEXT PRIMARY KEY,
            building_id TEXT NOT NULL,
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            is_locked INTEGER NOT NULL DEFAULT 0,
            locked_at TEXT,
            locked_by TEXT,
            version INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    ),
    (
        "charge_lines",
        r#"
        CREATE TABLE IF NOT EXISTS charge_lines (
            id TEXT PRIMARY KEY,
            period_id TEXT NOT NULL,
            apartment_id TEXT NOT NULL,
            base_charge TEXT NOT NULL,
            total_charge TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(period_id, apartment_id)
        );
        "#,
    ),
    (
        "audit_records",
        r#"
        CREATE TABLE IF NOT EXISTS audit_records (
            id TEXT PRIMARY KEY,
            actor_id TEXT NOT NULL,
            action TEXT NOT NULL,
            entity TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            old_value TEXT,
            new_value TEXT,
            metadata TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    ),
    (
        "charge_lines_period_idx",
        "CREATE INDEX IF NOT EXISTS charge_lines_period_idx ON charge_lines(period_id);",
    ),
    (
        "audit_records_entity_idx",
        "CREATE INDEX IF NOT EXISTS audit_records_entity_idx ON audit_records(entity_id, created_at);",
    ),
];

/// Applies every statement, in order, idempotently. Safe to call on
/// every connect — `CREATE TABLE IF NOT EXISTS` and `CREATE INDEX IF NOT
/// EXISTS` make re-application a no-op once the schema is in place.
#[instrument(skip(connection))]
pub async fn apply_schema(connection: &Connection) -> Result<(), DbError> {
    for (name, statement) in SCHEMA_STATEMENTS {
        debug!("applying schema statement: {name}");
        connection
            .execute(statement, ())
            .await
            .map_err(|source| DbError::ConnectionError(format!("{name}: {source}")))?;
    }
    Ok(())
}
