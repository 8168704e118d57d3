//! Error types for retirement runs

use thiserror::Error;

/// Errors that end a retirement run
///
/// Per-record remote failures never appear here; they are folded into the
/// [`RunReport`](crate::RunReport).
#[derive(Error, Debug)]
pub enum RetireError {
    /// The authenticated session could not be established; no record was touched
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
