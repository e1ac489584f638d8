//! Dense backend contracts
//!
//! These traits describe what a dense numeric storage type has to offer so
//! that copy-on-write containers can wrap it. They are pure interfaces; the
//! only implementation shipped here is for `ndarray` behind the `ndarray`
//! feature.

use num_traits::Zero;

use super::element::MatrixElement;

/// Trait for one-dimensional dense storage
///
/// `Clone` is the deep copy used whenever a shared backend diverges.
pub trait VectorBackend: Clone {
    /// The element type stored in this backend
    type Scalar: MatrixElement;

    /// Allocate a backend of `len` entries, all set to `value`
    fn filled(len: usize, value: Self::Scalar) -> Self;

    /// Allocate a backend holding a copy of `values`
    fn from_values(values: &[Self::Scalar]) -> Self;

    /// Number of entries
    fn size(&self) -> usize;

    /// Read an entry
    ///
    /// Panics if `index` is out of bounds.
    fn entry(&self, index: usize) -> Self::Scalar;

    /// Mutable access to an entry
    ///
    /// Panics if `index` is out of bounds.
    fn entry_mut(&mut self, index: usize) -> &mut Self::Scalar;

    /// Multiply every entry by `alpha`
    fn scale(&mut self, alpha: Self::Scalar);

    /// `self += alpha * other`; both backends have the same size
    fn add_scaled(&mut self, alpha: Self::Scalar, other: &Self);
}

/// Trait for two-dimensional dense storage
pub trait MatrixBackend: Clone {
    /// The element type stored in this backend
    type Scalar: MatrixElement;

    /// Allocate a `rows x cols` backend with every entry set to `value`
    fn filled(rows: usize, cols: usize, value: Self::Scalar) -> Self;

    /// Matrix dimensions as (rows, cols)
    fn dims(&self) -> (usize, usize);

    /// Read an entry
    ///
    /// Panics if the position is out of bounds.
    fn entry(&self, row: usize, col: usize) -> Self::Scalar;

    /// Mutable access to an entry
    ///
    /// Panics if the position is out of bounds.
    fn entry_mut(&mut self, row: usize, col: usize) -> &mut Self::Scalar;

    /// Multiply every entry by `alpha`
    fn scale(&mut self, alpha: Self::Scalar);

    /// `self += alpha * other`; both backends have the same dimensions
    fn add_scaled(&mut self, alpha: Self::Scalar, other: &Self);

    /// Matrix-vector product `y = self * x`
    ///
    /// `x` has `cols` entries and `y` has `rows` entries. The default
    /// implementation walks the entries row by row.
    fn apply<V>(&self, x: &V, y: &mut V)
    where
        V: VectorBackend<Scalar = Self::Scalar>,
    {
        let (rows, cols) = self.dims();
        for row in 0..rows {
            let mut acc = <Self::Scalar as Zero>::zero();
            for col in 0..cols {
                acc += self.entry(row, col) * x.entry(col);
            }
            *y.entry_mut(row) = acc;
        }
    }
}
