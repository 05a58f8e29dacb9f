use thiserror::Error;

use super::Collection;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Collection '{0}' is not part of this transaction")]
    OutOfScope(Collection),

    #[error("Collection '{0}' is read-only in this transaction")]
    ReadOnly(Collection),
}
