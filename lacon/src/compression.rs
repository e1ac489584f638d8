//! Configurable sparsity pattern compression
//!
//! Wraps [`lacon_core::compress_sparsity_pattern`] with a small configuration
//! layer and a row-parallel variant. Both paths produce identical patterns.

use lacon_core::pattern::compress_row;
use lacon_core::{
    check_compression_inputs, compress_sparsity_pattern, MatrixElement, MatrixInterface, Result,
    SparsityPattern,
};
use rayon::prelude::*;
use tracing::{debug, info};

/// Configuration for pattern compression
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompressionConfig {
    /// Entries with magnitude at or below this value are dropped
    pub threshold: f64,
    /// Compress rows on the rayon thread pool
    pub parallel: bool,
    /// Patterns with fewer rows always run sequentially
    pub min_parallel_rows: usize,
}

impl CompressionConfig {
    /// Create config with a magnitude threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Enable or disable row-parallel compression
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the row count below which compression stays sequential
    pub fn with_min_parallel_rows(mut self, min_parallel_rows: usize) -> Self {
        self.min_parallel_rows = min_parallel_rows;
        self
    }

    /// Whether a pattern with `rows` rows takes the parallel path
    pub fn runs_parallel(&self, rows: usize) -> bool {
        self.parallel && rows >= self.min_parallel_rows
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            parallel: false,
            min_parallel_rows: 1024,
        }
    }
}

/// Compressor applying a [`CompressionConfig`] to patterns
#[derive(Debug, Clone, Default)]
pub struct PatternCompressor {
    config: CompressionConfig,
}

impl PatternCompressor {
    /// Create a new compressor
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    /// Get the compression configuration
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress `pattern` against `matrix` using the configured threshold
    pub fn compress<M>(&self, pattern: &SparsityPattern, matrix: &M) -> Result<SparsityPattern>
    where
        M: MatrixInterface + Sync,
    {
        let threshold = <M::Scalar as MatrixElement>::from_f64(self.config.threshold);
        let parallel = self.config.runs_parallel(pattern.size());
        debug!(
            rows = pattern.size(),
            nnz = pattern.nnz(),
            threshold = self.config.threshold,
            parallel,
            "compressing sparsity pattern"
        );

        let compressed = if parallel {
            compress_sparsity_pattern_par(pattern, matrix, threshold)?
        } else {
            compress_sparsity_pattern(pattern, matrix, threshold)?
        };

        info!(
            rows = compressed.size(),
            nnz_before = pattern.nnz(),
            nnz_after = compressed.nnz(),
            "compressed sparsity pattern"
        );
        Ok(compressed)
    }
}

/// Row-parallel version of [`compress_sparsity_pattern`]
///
/// Rows are independent, so each one is compressed on the rayon pool and the
/// results are reassembled in row order.
pub fn compress_sparsity_pattern_par<M>(
    uncompressed: &SparsityPattern,
    matrix: &M,
    threshold: M::Scalar,
) -> Result<SparsityPattern>
where
    M: MatrixInterface + Sync,
{
    check_compression_inputs(uncompressed, matrix, threshold)?;

    let rows = uncompressed
        .iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .enumerate()
        .map(|(row, columns)| compress_row(row, columns, matrix, threshold))
        .collect::<Result<Vec<_>>>()?;
    Ok(SparsityPattern::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NdMatrix;
    use lacon_core::LaconError;

    fn banded(n: usize) -> (SparsityPattern, NdMatrix<f64>) {
        let matrix = NdMatrix::<f64>::from_fn(n, n, |row, col| {
            let distance = row.abs_diff(col);
            if distance == 0 {
                4.0
            } else {
                1.0 / distance as f64
            }
        });
        (SparsityPattern::full(n, n), matrix)
    }

    #[test]
    fn test_config_builder() {
        let config = CompressionConfig::with_threshold(0.25)
            .with_parallel(true)
            .with_min_parallel_rows(10);
        assert_eq!(config.threshold, 0.25);
        assert!(config.runs_parallel(10));
        assert!(!config.runs_parallel(9));
        assert!(!CompressionConfig::default().runs_parallel(1 << 20));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (pattern, matrix) = banded(64);
        let sequential = compress_sparsity_pattern(&pattern, &matrix, 0.2).unwrap();
        let parallel = compress_sparsity_pattern_par(&pattern, &matrix, 0.2).unwrap();
        assert_eq!(sequential, parallel);
        // |row - col| <= 4 survives a 0.2 threshold
        assert_eq!(sequential.row(10).len(), 9);
    }

    #[test]
    fn test_compressor_paths_agree() {
        let (pattern, matrix) = banded(32);
        let seq = PatternCompressor::new(CompressionConfig::with_threshold(0.3));
        let par = PatternCompressor::new(
            CompressionConfig::with_threshold(0.3)
                .with_parallel(true)
                .with_min_parallel_rows(1),
        );
        assert_eq!(
            seq.compress(&pattern, &matrix).unwrap(),
            par.compress(&pattern, &matrix).unwrap()
        );
    }

    #[test]
    fn test_parallel_rejects_invalid_input() {
        let (pattern, matrix) = banded(4);
        assert_eq!(
            compress_sparsity_pattern_par(&pattern, &matrix, -1.0),
            Err(LaconError::InvalidThreshold)
        );
        let short = SparsityPattern::new(3);
        assert!(matches!(
            compress_sparsity_pattern_par(&short, &matrix, 0.0),
            Err(LaconError::ShapeMismatch { .. })
        ));
    }
}
