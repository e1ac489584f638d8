//! Validation of raw byte buffers viewed as element slices

use crate::{LaconError, MatrixElement};

/// View a byte slice as a slice of elements without copying
///
/// The slice must be aligned for `T` and its length a multiple of
/// `size_of::<T>()`.
pub fn cast_elements<T: MatrixElement>(bytes: &[u8]) -> Result<&[T], LaconError> {
    bytemuck::try_cast_slice(bytes).map_err(|_| LaconError::Misaligned)
}
