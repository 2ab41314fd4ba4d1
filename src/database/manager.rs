use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgDocumentStore;
use crate::database::store::DocumentStore;
use crate::filter::FilterError;

/// Errors from the document store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid collection: {0}")]
    InvalidCollection(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<FilterError> for DatabaseError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidCollection(name) => DatabaseError::InvalidCollection(name),
            other => DatabaseError::QueryError(other.to_string()),
        }
    }
}

/// Opens the store selected by configuration
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory document store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let connection_string = Self::build_connection_string(config)?;
                let store = PgDocumentStore::connect(
                    &connection_string,
                    config.max_connections,
                    config.connection_timeout,
                )
                .await?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Use DATABASE_URL as-is, or assemble one from the DB_* parts
    pub fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = &config.url {
            let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            return Ok(parsed.into());
        }

        let name = config.name.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL or DB_NAME"))?;
        let mut url = url::Url::parse(&format!("postgres://{}", config.host))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if let Some(user) = &config.user {
            url.set_username(user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        if let Some(password) = &config.password {
            url.set_password(Some(password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        url.set_path(&format!("/{}", name));
        Ok(url.into())
    }
}
