//! [libs/infra/db/src/client.rs]
//! Connection management. Mirrors the rest of the workspace's
//! libSQL-adapter shape: one `Database` handle shared behind an `Arc`,
//! connections acquired per request and dropped on every exit path. A
//! `:memory:`/`mode=memory` URL keeps an anchor connection alive for the
//! lifetime of the client — otherwise SQLite reclaims the in-memory
//! schema as soon as the bootstrap connection drops.

use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::{info, instrument};

use crate::errors::DbError;
use crate::schema::apply_schema;

#[derive(Clone)]
pub struct ChargesDbClient {
    database: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl ChargesDbClient {
    #[instrument(skip(access_token))]
    pub async fn connect(database_url: &str, access_token: Option<String>) -> Result<Self, DbError> {
        if database_url.is_empty() {
            return Err(DbError::ConnectionError("database url is empty".into()));
        }

        let is_remote = database_url.starts_with("libsql://") || database_url.starts_with("https://");
        let is_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let database = if is_remote {
            let token = access_token
                .ok_or_else(|| DbError::ConnectionError("remote url requires an access token".into()))?;
            Builder::new_remote(database_url.to_string(), token).build().await
        } else {
            Builder::new_local(database_url).build().await
        }
        .map_err(|source| DbError::ConnectionError(source.to_string()))?;

        let database = Arc::new(database);

        let anchor = if is_memory {
            let anchor_connection = database
                .connect()
                .map_err(|source| DbError::ConnectionError(source.to_string()))?;
            apply_schema(&anchor_connection).await?;
            Some(Arc::new(anchor_connection))
        } else {
            let bootstrap_connection = database
                .connect()
                .map_err(|source| DbError::ConnectionError(source.to_string()))?;
            apply_schema(&bootstrap_connection).await?;
            None
        };

        info!(database_url, "charges database ready");

        Ok(Self {
            database,
            _memory_anchor: anchor,
        })
    }

    pub fn connection(&self) -> Result<Connection, DbError> {
        self.database
            .connect()
            .map_err(|source| DbError::ConnectionError(source.to_string()))
    }
}
