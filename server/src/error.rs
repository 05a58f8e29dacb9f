use thiserror::Error;

use crate::storage::StorageError;

/// Faults raised by wallet operations. A rejected ticket is not one of them;
/// see [`crate::ingest::IngestOutcome::Rejected`].
#[derive(Debug, Error)]
pub enum WalletError {
    /// Caller input failed a local precondition. Nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The referenced event does not exist. The validation endpoint was not contacted.
    #[error("Event {0} does not exist")]
    UnknownEvent(i64),

    /// Transport failure or unusable response from the validation endpoint.
    #[error("Validation endpoint failed: {0}")]
    ValidationEndpoint(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WalletError {
    pub fn validation(message: impl Into<String>) -> Self {
        WalletError::Validation(message.into())
    }

    pub fn endpoint(message: impl Into<String>) -> Self {
        WalletError::ValidationEndpoint(message.into())
    }
}
