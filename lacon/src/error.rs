//! Error type for container, I/O and parsing failures

use lacon_core::LaconError;
use thiserror::Error;

/// Errors raised by the `lacon` crate
#[derive(Debug, Error)]
pub enum Error {
    /// Precondition violated by a container or pattern operation
    #[error(transparent)]
    Container(#[from] LaconError),
    /// Underlying reader, writer or file mapping failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed line in a triplet file
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Result type for `lacon` operations
pub type Result<T> = std::result::Result<T, Error>;
