//! [libs/infra/db/src/errors.rs]
//! Storage-layer error catalog. Every variant maps onto exactly one
//! `charges_domain_models::CoreError` arm at the Persister boundary, so
//! callers above this crate never match on libSQL-specific detail.

use uuid::Uuid;

use charges_domain_models::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    ConnectionError(String),

    #[error("query failed: {0}")]
    QueryError(#[from] libsql::Error),

    #[error("row mapping failed: {0}")]
    MappingError(String),

    #[error("period {0} not found")]
    PeriodNotFound(Uuid),

    #[error("period {0} is locked")]
    PeriodLocked(Uuid),

    #[error("transaction failed: {0}")]
    TransactionError(String),
}

impl From<DbError> for CoreError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::PeriodNotFound(id) => CoreError::NotFound(format!("period {id}")),
            DbError::PeriodLocked(id) => CoreError::PeriodLocked(id),
            DbError::ConnectionError(message)
            | DbError::MappingError(message)
            | DbError::TransactionError(message) => CoreError::StorageFailure(message),
            DbError::QueryError(source) => CoreError::StorageFailure(source.to_string()),
        }
    }
}
