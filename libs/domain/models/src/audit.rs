//! [libs/domain/models/src/audit.rs]
//! Immutable, append-only audit trail entries. Outlive the entities
//! they reference and are never mutated once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Lock,
    Unlock,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct AuditRecord {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Uuid,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    /// Free-form payload: for `Create`/`Update` on a period this holds
    /// the full calculation breakdown, `input_hash`, and
    /// `calculation_version`; for `Lock`/`Unlock` it holds the actor and
    /// (for unlock) the mandatory reason.
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}
