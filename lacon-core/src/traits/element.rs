//! Scalar element constraints for LACON containers
//!
//! This module defines the trait that constrains what types can be stored
//! in vectors, matrices and compared against compression thresholds.

use core::fmt::{Debug, Display};
use core::ops::{AddAssign, MulAssign, Neg, Sub};

use num_traits::{One, Zero};

/// Data types supported as container elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// 32-bit floating point
    F32 = 0,
    /// 64-bit floating point
    F64 = 1,
}

impl Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DataType::F32 => write!(f, "f32"),
            DataType::F64 => write!(f, "f64"),
        }
    }
}

/// Trait for types that can be stored as container elements
///
/// Elements are plain old data (`bytemuck::Pod`) so that a mapped vector can
/// view caller bytes directly, and they carry the field operations needed by
/// in-place scaling, `axpy` and magnitude thresholding.
pub trait MatrixElement:
    Copy
    + PartialEq
    + PartialOrd
    + Debug
    + Display
    + Zero
    + One
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + MulAssign
    + bytemuck::Pod
    + Send
    + Sync
    + 'static
{
    /// Get the DataType tag for this element type
    fn data_type() -> DataType;

    /// Convert from f64 for generic construction
    fn from_f64(value: f64) -> Self;

    /// Convert to f64 for generic reporting
    fn to_f64(self) -> f64;

    /// Absolute value
    fn magnitude(self) -> Self {
        if self < Self::zero() {
            -self
        } else {
            self
        }
    }
}

impl MatrixElement for f32 {
    fn data_type() -> DataType {
        DataType::F32
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl MatrixElement for f64 {
    fn data_type() -> DataType {
        DataType::F64
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}
