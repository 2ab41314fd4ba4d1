use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Failure outcomes of a resource operation
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid {resource} id")]
    InvalidIdentity { resource: &'static str, details: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{context}: {source}")]
    StoreFailure {
        context: String,
        #[source]
        source: DatabaseError,
    },
}
