//! Precondition checks shared by containers and pattern compression
//!
//! Pure functions with no allocation: every check either passes or returns
//! the `LaconError` describing the violated bound.

pub mod bounds;
pub mod bytes;

pub use bounds::{check_col, check_row, check_shape, check_threshold};
pub use bytes::cast_elements;
