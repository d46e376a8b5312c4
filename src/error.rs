//! # Error Types
//!
//! This module defines error types used throughout the recibo library.

use thiserror::Error;

/// Main error type for recibo operations
#[derive(Debug, Error)]
pub enum ReciboError {
    /// Ledger store unreadable, unwritable or in an unsupported format
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// No matching serial device, or the device refused to open
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A write to an open port failed mid-stream
    #[error("Transmission error: {0}")]
    Transmission(String),

    /// Operation not valid in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation input rejected before reaching the ledger
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
