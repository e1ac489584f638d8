//! Container capability traits
//!
//! Vectors and matrices expose these so that algorithms such as pattern
//! compression can be written once against any container.

use super::element::MatrixElement;
use crate::error::Result;

/// Read access to a two-dimensional container
pub trait MatrixInterface {
    /// The element type stored in this matrix
    type Scalar: MatrixElement;

    /// Number of rows
    fn rows(&self) -> usize;

    /// Number of columns
    fn cols(&self) -> usize;

    /// Get the entry at (row, col)
    ///
    /// Implementations panic when the position is out of bounds.
    fn get_entry(&self, row: usize, col: usize) -> Self::Scalar;

    /// Get matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }
}

/// Element access for one-dimensional containers
pub trait VectorInterface {
    /// The element type stored in this vector
    type Scalar: MatrixElement;

    /// Number of entries
    fn size(&self) -> usize;

    /// Get the entry at `index`
    fn get_entry(&self, index: usize) -> Self::Scalar;

    /// Overwrite the entry at `index`
    fn set_entry(&mut self, index: usize, value: Self::Scalar);

    /// Add `value` to the entry at `index`
    fn add_to_entry(&mut self, index: usize, value: Self::Scalar);
}

/// Operations every copy-on-write container provides
pub trait ContainerInterface: Sized {
    /// The element type stored in this container
    type Scalar: MatrixElement;

    /// Deep copy sharing no storage with `self`
    fn copy(&self) -> Self;

    /// Scale every entry in place
    fn scal(&mut self, alpha: Self::Scalar);

    /// `self += alpha * other`
    ///
    /// Fails with `ShapeMismatch` without touching `self` when the shapes differ.
    fn axpy(&mut self, alpha: Self::Scalar, other: &Self) -> Result<()>;

    /// Whether `other` has the same shape as `self`
    fn has_equal_shape(&self, other: &Self) -> bool;
}
