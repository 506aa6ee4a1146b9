//! Error types for the user directory.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Any failure reported by the store. The underlying message is kept
    /// verbatim so callers can render it.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DirectoryError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
