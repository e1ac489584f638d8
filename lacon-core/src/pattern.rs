//! Sparsity patterns and threshold compression
//!
//! A [`SparsityPattern`] records, per row, the set of column indices that are
//! structurally nonzero. It carries no values; compression combines it with a
//! matrix to drop positions whose magnitude does not exceed a threshold.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;

use crate::validation::{check_col, check_threshold};
use crate::{LaconError, MatrixElement, MatrixInterface, Result};

/// Column index set of a single row
pub type RowSet = BTreeSet<usize>;

/// Per-row sets of nonzero column indices
///
/// The number of rows is fixed at construction. Column indices within a row
/// are unique and iterate in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparsityPattern {
    rows: Vec<RowSet>,
}

impl SparsityPattern {
    /// Create a pattern with `rows` empty rows
    pub fn new(rows: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| RowSet::new()).collect(),
        }
    }

    /// Create a pattern where every row holds every column in `0..cols`
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| (0..cols).collect()).collect(),
        }
    }

    /// Create a pattern from prebuilt row sets
    pub fn from_rows(rows: Vec<RowSet>) -> Self {
        Self { rows }
    }

    /// Number of rows
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Mutable column set of row `row`
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.size()`.
    pub fn set(&mut self, row: usize) -> &mut RowSet {
        assert!(
            row < self.rows.len(),
            "row {row} out of range for pattern with {} rows",
            self.rows.len()
        );
        &mut self.rows[row]
    }

    /// Column set of row `row`
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.size()`.
    pub fn row(&self, row: usize) -> &RowSet {
        assert!(
            row < self.rows.len(),
            "row {row} out of range for pattern with {} rows",
            self.rows.len()
        );
        &self.rows[row]
    }

    /// Column set of row `row`, or `None` when out of range
    pub fn get(&self, row: usize) -> Option<&RowSet> {
        self.rows.get(row)
    }

    /// Mark (row, col) as nonzero; returns whether it was newly inserted
    pub fn insert(&mut self, row: usize, col: usize) -> bool {
        self.set(row).insert(col)
    }

    /// Whether (row, col) is marked as nonzero
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows.get(row).is_some_and(|set| set.contains(&col))
    }

    /// Total number of marked positions
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(RowSet::len).sum()
    }

    /// Iterate over the row sets in row order
    pub fn iter(&self) -> core::slice::Iter<'_, RowSet> {
        self.rows.iter()
    }

    /// Iterate over all marked (row, col) positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, set)| set.iter().map(move |&col| (row, col)))
    }

    /// Compress this pattern against `matrix`; see [`compress_sparsity_pattern`]
    pub fn compress<M: MatrixInterface>(
        &self,
        matrix: &M,
        threshold: M::Scalar,
    ) -> Result<SparsityPattern> {
        compress_sparsity_pattern(self, matrix, threshold)
    }
}

impl<'a> IntoIterator for &'a SparsityPattern {
    type Item = &'a RowSet;
    type IntoIter = core::slice::Iter<'a, RowSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for SparsityPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pattern: {} rows, {} nonzeros", self.size(), self.nnz())?;
        for (row, set) in self.rows.iter().enumerate() {
            write!(f, "  {row}:")?;
            for col in set {
                write!(f, " {col}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Keep the entries of one row whose magnitude exceeds `threshold`
pub fn compress_row<M: MatrixInterface>(
    row: usize,
    columns: &RowSet,
    matrix: &M,
    threshold: M::Scalar,
) -> Result<RowSet> {
    let cols = matrix.cols();
    let mut compressed = RowSet::new();
    for &col in columns {
        check_col(col, cols)?;
        if matrix.get_entry(row, col).magnitude() > threshold {
            compressed.insert(col);
        }
    }
    Ok(compressed)
}

/// Validate a compression request before any row is visited
///
/// The threshold must be nonnegative and the pattern must have one row per
/// matrix row.
pub fn check_compression_inputs<M: MatrixInterface>(
    pattern: &SparsityPattern,
    matrix: &M,
    threshold: M::Scalar,
) -> Result<()> {
    check_threshold(threshold)?;
    if pattern.size() != matrix.rows() {
        return Err(LaconError::ShapeMismatch {
            expected: (pattern.size(), matrix.cols()),
            found: matrix.dimensions(),
        });
    }
    Ok(())
}

/// Build a compressed copy of `uncompressed`
///
/// For every row `r` and column `c` of the input pattern, `c` is kept iff
/// `|matrix(r, c)| > threshold`. Positions equal to the threshold are dropped,
/// so structurally present zeros vanish for a zero threshold. Columns absent
/// from the input are never added and neither input is modified.
///
/// Fails with `InvalidThreshold` for a negative or NaN threshold, with
/// `ShapeMismatch` when the pattern and matrix row counts differ, and with
/// `IndexOutOfRange` when a pattern column lies outside the matrix.
pub fn compress_sparsity_pattern<M: MatrixInterface>(
    uncompressed: &SparsityPattern,
    matrix: &M,
    threshold: M::Scalar,
) -> Result<SparsityPattern> {
    check_compression_inputs(uncompressed, matrix, threshold)?;

    let rows = uncompressed
        .iter()
        .enumerate()
        .map(|(row, columns)| compress_row(row, columns, matrix, threshold))
        .collect::<Result<Vec<_>>>()?;
    Ok(SparsityPattern::from_rows(rows))
}
