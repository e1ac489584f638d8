//! Owned copy-on-write dense matrix

use std::fmt;
use std::sync::Arc;

use lacon_core::{
    check_col, check_row, check_shape, ContainerInterface, LaconError, MatrixBackend,
    MatrixElement, MatrixInterface, One, Result, SparsityPattern, VectorBackend, Zero,
};

use crate::handle::CowHandle;
use crate::vector::DenseVector;

/// Dense matrix over a shared, lazily cloned backend
///
/// Row and column counts are always read from the backend. Every mutating
/// method runs the uniqueness check before touching the backend, so a
/// cloned matrix keeps its values no matter what happens to the original.
#[derive(Clone)]
pub struct DenseMatrix<B: MatrixBackend> {
    backend: CowHandle<B>,
}

impl<B: MatrixBackend> DenseMatrix<B> {
    /// Create a `rows x cols` matrix with every entry equal to `value`
    pub fn new(rows: usize, cols: usize, value: B::Scalar) -> Self {
        Self::wrap(B::filled(rows, cols, value))
    }

    /// Create a `rows x cols` matrix of zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, <B::Scalar as Zero>::zero())
    }

    /// Create a zero matrix for a sparsity pattern
    ///
    /// Dense storage has no use for the pattern; it is accepted so that dense
    /// and sparse containers can be built the same way.
    pub fn from_pattern(rows: usize, cols: usize, _pattern: &SparsityPattern) -> Self {
        Self::zeros(rows, cols)
    }

    /// Create a matrix whose entries are `f(row, col)`
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> B::Scalar,
    {
        let mut backend = B::filled(rows, cols, <B::Scalar as Zero>::zero());
        for row in 0..rows {
            for col in 0..cols {
                *backend.entry_mut(row, col) = f(row, col);
            }
        }
        Self::wrap(backend)
    }

    /// Copy any matrix-shaped value entry by entry
    pub fn from_matrix<M>(other: &M) -> Self
    where
        M: MatrixInterface<Scalar = B::Scalar>,
    {
        Self::from_fn(other.rows(), other.cols(), |row, col| other.get_entry(row, col))
    }

    /// Create a matrix holding a deep copy of `backend`
    pub fn from_backend(backend: &B) -> Self {
        Self::wrap(backend.clone())
    }

    /// Take ownership of a backend value
    pub fn wrap(backend: B) -> Self {
        Self {
            backend: CowHandle::new(backend),
        }
    }

    /// Take ownership of a boxed backend
    pub fn adopt(backend: Box<B>) -> Self {
        Self {
            backend: CowHandle::adopt(backend),
        }
    }

    /// Take ownership of a backend allocated with `Box`
    ///
    /// # Safety
    ///
    /// `backend` must come from `Box::into_raw` and must not be used or freed
    /// by the caller afterwards.
    pub unsafe fn from_raw(backend: *mut B) -> Self {
        // SAFETY: the caller hands over a pointer obtained from Box::into_raw
        Self::adopt(unsafe { Box::from_raw(backend) })
    }

    /// Share an existing backend without copying it
    pub fn from_shared(backend: Arc<B>) -> Self {
        Self {
            backend: CowHandle::from_shared(backend),
        }
    }

    /// Replace the contents with a deep copy of `backend`
    pub fn assign_backend(&mut self, backend: &B) {
        self.backend = CowHandle::new(backend.clone());
    }

    /// Read access to the backend
    pub fn backend(&self) -> &B {
        self.backend.get()
    }

    /// Mutable access to the backend; diverges from any sharers first
    pub fn backend_mut(&mut self) -> &mut B {
        self.ensure_uniqueness()
    }

    /// Whether no other container shares this matrix's backend
    pub fn is_uniquely_owned(&self) -> bool {
        self.backend.is_uniquely_owned()
    }

    /// Whether `self` and `other` currently share one backend
    pub fn shares_backend_with(&self, other: &Self) -> bool {
        self.backend.ptr_eq(&other.backend)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.backend().dims().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.backend().dims().1
    }

    /// Entry at (row, col), or `None` when out of range
    pub fn get(&self, row: usize, col: usize) -> Option<B::Scalar> {
        let (rows, cols) = self.backend().dims();
        (row < rows && col < cols).then(|| self.backend().entry(row, col))
    }

    /// Entry at (row, col)
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()` or `col >= self.cols()`.
    pub fn get_entry(&self, row: usize, col: usize) -> B::Scalar {
        self.assert_in_range(row, col);
        self.backend().entry(row, col)
    }

    /// Overwrite the entry at (row, col)
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()` or `col >= self.cols()`.
    pub fn set_entry(&mut self, row: usize, col: usize, value: B::Scalar) {
        self.assert_in_range(row, col);
        *self.ensure_uniqueness().entry_mut(row, col) = value;
    }

    /// Add `value` to the entry at (row, col)
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()` or `col >= self.cols()`.
    pub fn add_to_entry(&mut self, row: usize, col: usize, value: B::Scalar) {
        self.assert_in_range(row, col);
        *self.ensure_uniqueness().entry_mut(row, col) += value;
    }

    /// Zero every entry of row `row`
    pub fn clear_row(&mut self, row: usize) -> Result<()> {
        let (rows, cols) = self.backend().dims();
        check_row(row, rows)?;
        let backend = self.ensure_uniqueness();
        for col in 0..cols {
            *backend.entry_mut(row, col) = <B::Scalar as Zero>::zero();
        }
        Ok(())
    }

    /// Zero every entry of column `col`
    pub fn clear_col(&mut self, col: usize) -> Result<()> {
        let (rows, cols) = self.backend().dims();
        check_col(col, cols)?;
        let backend = self.ensure_uniqueness();
        for row in 0..rows {
            *backend.entry_mut(row, col) = <B::Scalar as Zero>::zero();
        }
        Ok(())
    }

    /// Zero row `row` and put a one on its diagonal position
    ///
    /// The diagonal position (row, row) must exist, so `row` is also checked
    /// against the column count.
    pub fn unit_row(&mut self, row: usize) -> Result<()> {
        let (rows, cols) = self.backend().dims();
        check_row(row, rows)?;
        check_col(row, cols)?;
        self.clear_row(row)?;
        *self.ensure_uniqueness().entry_mut(row, row) = <B::Scalar as One>::one();
        Ok(())
    }

    /// Zero column `col` and put a one on its diagonal position
    ///
    /// The diagonal position (col, col) must exist, so `col` is also checked
    /// against the row count.
    pub fn unit_col(&mut self, col: usize) -> Result<()> {
        let (rows, cols) = self.backend().dims();
        check_col(col, cols)?;
        check_row(col, rows)?;
        self.clear_col(col)?;
        *self.ensure_uniqueness().entry_mut(col, col) = <B::Scalar as One>::one();
        Ok(())
    }

    /// Zero every entry
    pub fn clear(&mut self) {
        let (rows, cols) = self.dims();
        let backend = self.ensure_uniqueness();
        for row in 0..rows {
            for col in 0..cols {
                *backend.entry_mut(row, col) = <B::Scalar as Zero>::zero();
            }
        }
    }

    /// Multiply every entry by `alpha`
    pub fn scal(&mut self, alpha: B::Scalar) {
        self.ensure_uniqueness().scale(alpha);
    }

    /// `self += alpha * other`
    ///
    /// Fails with `ShapeMismatch` before touching `self` when the shapes differ.
    pub fn axpy(&mut self, alpha: B::Scalar, other: &Self) -> Result<()> {
        if !self.has_equal_shape(other) {
            return Err(LaconError::ShapeMismatch {
                expected: self.dims(),
                found: other.dims(),
            });
        }
        // Plain read of the other backend: it never has to diverge.
        let source = other.backend();
        self.ensure_uniqueness().add_scaled(alpha, source);
        Ok(())
    }

    /// Whether `other` has the same number of rows and columns
    pub fn has_equal_shape(&self, other: &Self) -> bool {
        self.dims() == other.dims()
    }

    /// Matrix-vector product `y = self * x`
    pub fn mv<V>(&self, x: &DenseVector<V>, y: &mut DenseVector<V>) -> Result<()>
    where
        V: VectorBackend<Scalar = B::Scalar>,
    {
        let (rows, cols) = self.dims();
        check_shape((cols, 1), (x.size(), 1))?;
        check_shape((rows, 1), (y.size(), 1))?;
        self.backend().apply(x.backend(), y.backend_mut());
        Ok(())
    }

    /// Deep copy sharing no storage with `self`
    pub fn copy(&self) -> Self {
        Self {
            backend: self.backend.deep_copy(),
        }
    }

    /// Iterate over all entries in row-major order as (row, col, value)
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, B::Scalar)> + '_ {
        let backend = self.backend();
        let (rows, cols) = backend.dims();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col, backend.entry(row, col))))
    }

    fn dims(&self) -> (usize, usize) {
        self.backend().dims()
    }

    fn assert_in_range(&self, row: usize, col: usize) {
        let (rows, cols) = self.dims();
        assert!(
            row < rows && col < cols,
            "entry ({row}, {col}) out of range for {rows}x{cols} matrix"
        );
    }

    fn ensure_uniqueness(&mut self) -> &mut B {
        self.backend.get_mutable()
    }
}

impl<B: MatrixBackend> PartialEq for DenseMatrix<B> {
    fn eq(&self, other: &Self) -> bool {
        self.has_equal_shape(other)
            && self
                .entries()
                .zip(other.entries())
                .all(|((_, _, a), (_, _, b))| a == b)
    }
}

impl<B: MatrixBackend> fmt::Debug for DenseMatrix<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseMatrix")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("data_type", &<B::Scalar as MatrixElement>::data_type())
            .finish_non_exhaustive()
    }
}

impl<B: MatrixBackend> fmt::Display for DenseMatrix<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.dims();
        writeln!(
            f,
            "{rows}x{cols} {} matrix",
            <B::Scalar as MatrixElement>::data_type()
        )?;
        for row in 0..rows {
            write!(f, "[")?;
            for col in 0..cols {
                if col > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.backend().entry(row, col))?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

impl<B: MatrixBackend> MatrixInterface for DenseMatrix<B> {
    type Scalar = B::Scalar;

    fn rows(&self) -> usize {
        DenseMatrix::rows(self)
    }

    fn cols(&self) -> usize {
        DenseMatrix::cols(self)
    }

    fn get_entry(&self, row: usize, col: usize) -> B::Scalar {
        DenseMatrix::get_entry(self, row, col)
    }
}

impl<B: MatrixBackend> ContainerInterface for DenseMatrix<B> {
    type Scalar = B::Scalar;

    fn copy(&self) -> Self {
        DenseMatrix::copy(self)
    }

    fn scal(&mut self, alpha: B::Scalar) {
        DenseMatrix::scal(self, alpha)
    }

    fn axpy(&mut self, alpha: B::Scalar, other: &Self) -> Result<()> {
        DenseMatrix::axpy(self, alpha, other)
    }

    fn has_equal_shape(&self, other: &Self) -> bool {
        DenseMatrix::has_equal_shape(self, other)
    }
}
