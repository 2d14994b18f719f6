//! Error types for the blescan library
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Errors that can occur in the scan module.
///
/// Status codes returned by the external BLE stack are carried through
/// unmodified in [`ScanError::Stack`]; the session controller never
/// reinterprets or retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("BLE stack returned status {0:#04x}")]
    Stack(u8),
}
