//! Database-specific error types and conversions.

use userdir_core::error::DirectoryError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Malformed record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for DirectoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => DirectoryError::NotFound { entity, id },
            DbError::Decode(msg) => DirectoryError::Internal(msg),
            other => DirectoryError::Database(other.to_string()),
        }
    }
}

/// Parse a stored UUID string, reporting which field was malformed.
pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}
