//! Abstract interfaces for LACON containers
//!
//! This module defines all trait abstractions used in the LACON ecosystem:
//! scalar elements, dense backend contracts and container capabilities.

pub mod backend;
pub mod element;
pub mod matrix;

pub use backend::{MatrixBackend, VectorBackend};
pub use element::{DataType, MatrixElement};
pub use matrix::{ContainerInterface, MatrixInterface, VectorInterface};
