//! Domain error types

use thiserror::Error;

/// Errors that can occur while driving the receiver
///
/// Out-of-range tuning or volume input is clamped rather than rejected, and
/// unknown RDS groups are skipped, so neither has a variant here.
#[derive(Error, Debug)]
pub enum RadioError {
    #[error("Bus transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for receiver operations
pub type RadioResult<T> = Result<T, RadioError>;
