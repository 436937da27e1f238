//! [apps/orchestrator/src/errors.rs]
//! Errors crossing the Orchestrator boundary: either a `CoreError`
//! surfaced unchanged from the Calculator or the Persister, or an
//! opaque failure while loading entities from the external storage
//! collaborator (§6 — that collaborator's schema is out of scope here,
//! so its failures are carried as `anyhow::Error`).

use charges_domain_models::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to load building data: {0}")]
    DataSource(#[from] anyhow::Error),

    #[error("stored calculation for period {0} could not be decoded")]
    CorruptCache(uuid::Uuid),
}
