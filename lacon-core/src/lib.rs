#![cfg_attr(not(test), no_std)]

//! LACON Core - element, backend and sparsity pattern definitions
//!
//! This crate provides the pieces of the copy-on-write container family that
//! do not depend on ownership machinery: the scalar element trait, the dense
//! backend contract, the capability traits implemented by containers, and the
//! sparsity pattern together with its threshold compression.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod traits;
pub mod validation;

#[cfg(feature = "alloc")]
pub mod pattern;

#[cfg(feature = "ndarray")]
mod ndarray_backend;

pub use error::*;
pub use num_traits::{One, Zero};
pub use traits::*;
pub use validation::{cast_elements, check_col, check_row, check_shape, check_threshold};

#[cfg(feature = "alloc")]
pub use pattern::{check_compression_inputs, compress_sparsity_pattern, SparsityPattern};
