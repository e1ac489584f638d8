//! Error types for container operations

use thiserror::Error;

/// Axis an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Matrix row
    Row,
    /// Matrix column
    Column,
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Errors that can occur during container and pattern operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LaconError {
    /// Index outside the current bounds of a container or pattern
    #[error("{axis} index {index} is out of range (bound {bound})")]
    IndexOutOfRange {
        axis: Axis,
        index: usize,
        bound: usize,
    },
    /// Operands of a binary operation have different shapes
    #[error("shape {found:?} does not match expected shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Compression threshold is negative or not a number
    #[error("compression threshold must be nonnegative")]
    InvalidThreshold,
    /// Raw bytes cannot be viewed as the requested element type
    #[error("byte buffer is not aligned or sized for the element type")]
    Misaligned,
}

/// Result type for container operations
pub type Result<T> = core::result::Result<T, LaconError>;
