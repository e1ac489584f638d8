//! Whole-matrix helpers built on the container interfaces

use lacon_core::{
    check_shape, MatrixBackend, MatrixElement, MatrixInterface, One, Result, VectorBackend, Zero,
};

use crate::matrix::DenseMatrix;
use crate::vector::DenseVector;

/// Sum of the diagonal entries
///
/// Walks `min(rows, cols)` diagonal positions, so it is also defined for
/// rectangular matrices.
pub fn trace<M: MatrixInterface>(matrix: &M) -> M::Scalar {
    let n = matrix.rows().min(matrix.cols());
    let mut sum = <M::Scalar as Zero>::zero();
    for i in 0..n {
        sum += matrix.get_entry(i, i);
    }
    sum
}

/// Diagonal entries as a vector
pub fn diagonal<M, V>(matrix: &M) -> DenseVector<V>
where
    M: MatrixInterface,
    V: VectorBackend<Scalar = M::Scalar>,
{
    let n = matrix.rows().min(matrix.cols());
    (0..n).map(|i| matrix.get_entry(i, i)).collect()
}

/// Whether `b` equals the transpose of `a` up to `tolerance`
///
/// Returns `false` when the shapes are not transposed to each other or when
/// any `|a(i, j) - b(j, i)|` exceeds `tolerance`.
pub fn are_transposed<A, B>(a: &A, b: &B, tolerance: A::Scalar) -> bool
where
    A: MatrixInterface,
    B: MatrixInterface<Scalar = A::Scalar>,
{
    if a.rows() != b.cols() || a.cols() != b.rows() {
        return false;
    }
    (0..a.rows()).all(|row| {
        (0..a.cols()).all(|col| {
            (a.get_entry(row, col) - b.get_entry(col, row)).magnitude() <= tolerance
        })
    })
}

/// Add the entries of `source` whose magnitude exceeds `eps` into `dest`
///
/// Entries at or below `eps` are skipped, so `dest` only diverges from its
/// sharers if at least one entry is added.
pub fn add_matrix<B, M>(dest: &mut DenseMatrix<B>, source: &M, eps: B::Scalar) -> Result<()>
where
    B: MatrixBackend,
    M: MatrixInterface<Scalar = B::Scalar>,
{
    check_shape((dest.rows(), dest.cols()), source.dimensions())?;
    for row in 0..source.rows() {
        for col in 0..source.cols() {
            let value = source.get_entry(row, col);
            if value.magnitude() > eps {
                dest.add_to_entry(row, col, value);
            }
        }
    }
    Ok(())
}

/// `n x n` identity matrix
pub fn identity<B: MatrixBackend>(n: usize) -> DenseMatrix<B> {
    let mut backend = B::filled(n, n, <B::Scalar as Zero>::zero());
    for i in 0..n {
        *backend.entry_mut(i, i) = <B::Scalar as One>::one();
    }
    DenseMatrix::wrap(backend)
}
