//! Index, shape and threshold validation

use crate::{Axis, LaconError, MatrixElement};

/// Validate a row index against a row count
pub const fn check_row(row: usize, rows: usize) -> Result<(), LaconError> {
    check_index(Axis::Row, row, rows)
}

/// Validate a column index against a column count
pub const fn check_col(col: usize, cols: usize) -> Result<(), LaconError> {
    check_index(Axis::Column, col, cols)
}

const fn check_index(axis: Axis, index: usize, bound: usize) -> Result<(), LaconError> {
    if index >= bound {
        return Err(LaconError::IndexOutOfRange { axis, index, bound });
    }
    Ok(())
}

/// Validate that two shapes are identical
pub const fn check_shape(
    expected: (usize, usize),
    found: (usize, usize),
) -> Result<(), LaconError> {
    if expected.0 != found.0 || expected.1 != found.1 {
        return Err(LaconError::ShapeMismatch { expected, found });
    }
    Ok(())
}

/// Validate a magnitude threshold
///
/// Rejects negative values and NaN.
pub fn check_threshold<T: MatrixElement>(threshold: T) -> Result<(), LaconError> {
    // NaN compares false against everything, so test for the accepted range.
    if threshold >= T::zero() {
        Ok(())
    } else {
        Err(LaconError::InvalidThreshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_index() {
        assert_eq!(check_row(0, 3), Ok(()));
        assert_eq!(check_col(2, 3), Ok(()));
        assert_eq!(
            check_row(3, 3),
            Err(LaconError::IndexOutOfRange {
                axis: Axis::Row,
                index: 3,
                bound: 3
            })
        );
        assert_eq!(
            check_col(0, 0),
            Err(LaconError::IndexOutOfRange {
                axis: Axis::Column,
                index: 0,
                bound: 0
            })
        );
    }

    #[test]
    fn test_check_shape() {
        assert_eq!(check_shape((2, 3), (2, 3)), Ok(()));
        assert_eq!(
            check_shape((2, 3), (3, 2)),
            Err(LaconError::ShapeMismatch {
                expected: (2, 3),
                found: (3, 2)
            })
        );
    }

    #[test]
    fn test_check_threshold() {
        assert_eq!(check_threshold(0.0f64), Ok(()));
        assert_eq!(check_threshold(0.4f32), Ok(()));
        assert_eq!(check_threshold(-1e-12f64), Err(LaconError::InvalidThreshold));
        assert_eq!(check_threshold(f64::NAN), Err(LaconError::InvalidThreshold));
    }
}
