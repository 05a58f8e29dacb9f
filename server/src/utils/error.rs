use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::error::WalletError;
use crate::storage::StorageError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(i64),

    #[error("Validation endpoint error: {0}")]
    ValidationEndpointError(String),

    #[error("Storage error")]
    StorageError(#[from] StorageError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnknownEvent(_) => StatusCode::NOT_FOUND,
            AppError::ValidationEndpointError(_) => StatusCode::BAD_GATEWAY,
            AppError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::UnknownEvent(_) => "UNKNOWN_EVENT",
            AppError::ValidationEndpointError(_) => "VALIDATION_ENDPOINT_ERROR",
            AppError::StorageError(_) => "STORAGE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => {
                tracing::info!(code = self.code(), message = %msg, "Request refused");
            }
            AppError::UnknownEvent(event_id) => {
                tracing::info!(code = self.code(), event_id, "Request refused");
            }
            AppError::ValidationEndpointError(msg) => {
                error!(error = ?self, message = %msg, "Validation endpoint error");
            }
            AppError::StorageError(e) => {
                error!(error = ?e, "Storage error");
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::UnknownEvent(event_id) => format!("Event {event_id} does not exist"),
            AppError::ValidationEndpointError(_) => "Ticket could not be validated".to_string(),
            AppError::StorageError(_) => "A storage error occurred".to_string(),
        }
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Validation(msg) => AppError::ValidationError(msg),
            WalletError::UnknownEvent(event_id) => AppError::UnknownEvent(event_id),
            WalletError::ValidationEndpoint(msg) => AppError::ValidationEndpointError(msg),
            WalletError::Storage(e) => AppError::StorageError(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Endpoint and storage internals stay in the log
        error_response(code, self.public_message(), None, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_errors_map_to_statuses() {
        let cases = [
            (WalletError::validation("empty name"), StatusCode::BAD_REQUEST),
            (WalletError::UnknownEvent(3), StatusCode::NOT_FOUND),
            (WalletError::endpoint("timeout"), StatusCode::BAD_GATEWAY),
            (
                WalletError::Storage(StorageError::ReadOnly(crate::storage::Collection::Events)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_endpoint_detail_is_not_public() {
        let err = AppError::from(WalletError::endpoint("dns error: api.internal"));
        assert!(!err.public_message().contains("api.internal"));
    }
}
