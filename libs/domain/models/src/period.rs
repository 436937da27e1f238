//! [libs/domain/models/src/period.rs]
//! A billing period: the unit of calculation and of locking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a period, derived from `is_locked` plus whether
/// charge lines exist. The state itself is not stored — callers derive
/// it from the stored fields — but it is useful vocabulary at the
/// Orchestrator boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// No charge lines exist yet.
    Draft,
    /// Charge lines exist, `is_locked == false`.
    Calculated,
    /// `is_locked == true`.
    Locked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Period {
    pub id: Uuid,
    pub building_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub due_date: NaiveDate,
    pub is_locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<Uuid>,
    /// Monotonic counter bumped by the Persister on every
    /// `store_calculation` that updates an existing row.
    pub version: u32,
}

impl Period {
    pub fn status(&self, has_charge_lines: bool) -> PeriodStatus {
        if self.is_locked {
            PeriodStatus::Locked
        } else if has_charge_lines {
            PeriodStatus::Calculated
        } else {
            PeriodStatus::Draft
        }
    }
}
