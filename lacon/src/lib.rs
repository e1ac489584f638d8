//! LACON - Copy-on-write dense vectors and matrices
//!
//! This library wraps dense numeric backends in containers with value
//! semantics: copies share one buffer until either side is written, at which
//! point the writer detaches onto its own deep copy.
//!
//! ## Architecture
//!
//! LACON follows the same contract/implementation split as its core crate:
//!
//! - **lacon-core**: Element and backend traits, bounds validation, sparsity
//!   patterns and threshold compression (no I/O, `no_std`)
//! - **lacon**: Shared-handle containers, memory-mapped views, parallel
//!   compression and triplet I/O
//!
//! ## Quick Start
//!
//! ```rust
//! use lacon::{NdMatrix, NdVector, SparsityPattern};
//!
//! let a: NdVector<f64> = vec![1.0, 2.0].into();
//! let mut b = a.clone();
//! assert!(b.shares_backend_with(&a));
//!
//! b.set_entry(0, 5.0);
//! assert_eq!(a.get_entry(0), 1.0);
//! assert!(!b.shares_backend_with(&a));
//!
//! let m = NdMatrix::<f64>::from_fn(2, 2, |row, col| if row == col { 1.0 } else { 1e-9 });
//! let pattern = SparsityPattern::full(2, 2).compress(&m, 1e-6).unwrap();
//! assert_eq!(pattern.nnz(), 2);
//! ```
//!
//! ## Features
//!
//! - **ndarray**: `Array1`/`Array2` dense backends (required)
//! - **mmap**: Map raw vector files as read-only views
//! - **serde**: Serialize patterns and compression settings
//! - **cli**: Dependencies of the `compress_pattern` example

#[cfg(not(feature = "ndarray"))]
compile_error!("lacon requires a dense backend; enable the `ndarray` feature");

// Re-export core abstractions
pub use lacon_core::{
    // Core traits
    ContainerInterface, MatrixBackend, MatrixElement, MatrixInterface, VectorBackend,
    VectorInterface, DataType,
    // Patterns
    compress_sparsity_pattern, SparsityPattern,
    // Error handling
    Axis, LaconError,
};

pub mod compression;
pub mod error;
pub mod handle;
pub mod io;
pub mod mapped;
pub mod matrix;
pub mod ops;
pub mod vector;

pub use compression::{compress_sparsity_pattern_par, CompressionConfig, PatternCompressor};
pub use error::{Error, Result};
pub use handle::CowHandle;
pub use io::{read_sparse_matrix, read_triplets, write_raw_vector, write_sparse_matrix};
pub use mapped::MappedVector;
pub use matrix::DenseMatrix;
pub use vector::DenseVector;

/// Vector over an `ndarray` buffer
#[cfg(feature = "ndarray")]
pub type NdVector<T> = DenseVector<ndarray::Array1<T>>;

/// Mapped vector detaching into an `ndarray` buffer
#[cfg(feature = "ndarray")]
pub type NdMappedVector<'a, T> = MappedVector<'a, ndarray::Array1<T>>;

/// Matrix over an `ndarray` buffer
#[cfg(feature = "ndarray")]
pub type NdMatrix<T> = DenseMatrix<ndarray::Array2<T>>;
