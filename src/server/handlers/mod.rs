//! HTTP handlers for the server.

pub mod operations;
pub mod printer;

use axum::http::StatusCode;

use crate::error::ReciboError;

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

/// Map a library error to its HTTP status.
pub fn api_error(e: ReciboError) -> ApiError {
    let status = match &e {
        ReciboError::Validation(_) => StatusCode::BAD_REQUEST,
        ReciboError::NotFound(_) => StatusCode::NOT_FOUND,
        ReciboError::InvalidState(_) => StatusCode::CONFLICT,
        ReciboError::DeviceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ReciboError::Transmission(_) => StatusCode::BAD_GATEWAY,
        ReciboError::Persistence(_) | ReciboError::Io(_) => {
            tracing::error!(error = %e, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

/// Run ledger or printer work off the async runtime.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ReciboError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task error: {}", e),
            )
        })?
        .map_err(api_error)
}
