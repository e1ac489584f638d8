//! Text and binary I/O for matrices, patterns and vectors
//!
//! Sparse matrices are exchanged as `row,col,value` triplet lines. Raw vector
//! files hold native-endian scalars back to back and can be mapped with
//! `MappedVector::open`.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use lacon_core::{check_col, check_row, MatrixBackend, MatrixElement, MatrixInterface, SparsityPattern};
use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::DenseMatrix;

/// Write the entries of `matrix` at the positions of `pattern`
///
/// Each position becomes one `row,col,value` line with the value in
/// scientific notation carrying 12 fractional digits.
pub fn write_sparse_matrix<M, W>(matrix: &M, pattern: &SparsityPattern, writer: W) -> Result<()>
where
    M: MatrixInterface,
    W: Write,
{
    for (row, col) in pattern.positions() {
        check_row(row, matrix.rows())?;
        check_col(col, matrix.cols())?;
    }

    let mut writer = BufWriter::new(writer);
    for (row, col) in pattern.positions() {
        let value = matrix.get_entry(row, col).to_f64();
        writeln!(writer, "{row},{col},{value:.12e}")?;
    }
    writer.flush()?;
    debug!(nnz = pattern.nnz(), "wrote sparse matrix");
    Ok(())
}

/// Parse `row,col,value` lines
///
/// Blank lines are skipped; line numbers in errors start at 1.
pub fn read_triplets<R: BufRead>(reader: R) -> Result<Vec<(usize, usize, f64)>> {
    let mut triplets = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        triplets.push(parse_triplet(trimmed, index + 1)?);
    }
    Ok(triplets)
}

fn parse_triplet(line: &str, number: usize) -> Result<(usize, usize, f64)> {
    let parse_error = |reason: String| Error::Parse {
        line: number,
        reason,
    };

    let mut fields = line.split(',').map(str::trim);
    let (Some(row), Some(col), Some(value), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(parse_error(format!(
            "expected `row,col,value`, found `{line}`"
        )));
    };

    let row = row
        .parse::<usize>()
        .map_err(|e| parse_error(format!("invalid row `{row}`: {e}")))?;
    let col = col
        .parse::<usize>()
        .map_err(|e| parse_error(format!("invalid column `{col}`: {e}")))?;
    let value = value
        .parse::<f64>()
        .map_err(|e| parse_error(format!("invalid value `{value}`: {e}")))?;
    Ok((row, col, value))
}

/// Read triplets into `matrix`, returning the pattern of positions read
///
/// The matrix is cleared first. Repeated positions accumulate.
pub fn read_sparse_matrix<R, B>(reader: R, matrix: &mut DenseMatrix<B>) -> Result<SparsityPattern>
where
    R: BufRead,
    B: MatrixBackend,
{
    let triplets = read_triplets(reader)?;
    let (rows, cols) = (matrix.rows(), matrix.cols());
    for &(row, col, _) in &triplets {
        check_row(row, rows)?;
        check_col(col, cols)?;
    }

    matrix.clear();
    let mut pattern = SparsityPattern::new(rows);
    for (row, col, value) in triplets {
        matrix.add_to_entry(row, col, B::Scalar::from_f64(value));
        pattern.insert(row, col);
    }
    debug!(rows, cols, nnz = pattern.nnz(), "read sparse matrix");
    Ok(pattern)
}

/// Dump `values` as native-endian scalars
pub fn write_raw_vector<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: MatrixElement,
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(bytemuck::cast_slice(values))?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NdMatrix;
    use lacon_core::{Axis, LaconError};
    use std::io::Cursor;

    #[test]
    fn test_write_sparse_matrix() {
        let matrix = NdMatrix::<f64>::from_fn(2, 3, |row, col| (row * 3 + col) as f64 * 0.5);
        let mut pattern = SparsityPattern::new(2);
        pattern.insert(0, 2);
        pattern.insert(1, 0);

        let mut out = Vec::new();
        write_sparse_matrix(&matrix, &pattern, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "0,2,1.000000000000e0\n1,0,1.500000000000e0\n");
    }

    #[test]
    fn test_write_rejects_positions_outside_matrix() {
        let matrix = NdMatrix::<f64>::new(2, 2, 1.0);
        let mut pattern = SparsityPattern::new(2);
        pattern.insert(0, 0);
        pattern.insert(1, 5);

        let mut out = Vec::new();
        let err = write_sparse_matrix(&matrix, &pattern, &mut out).unwrap_err();
        assert!(out.is_empty());
        assert!(matches!(
            err,
            Error::Container(LaconError::IndexOutOfRange {
                axis: Axis::Column,
                ..
            })
        ));
    }

    #[test]
    fn test_read_accumulates_and_clears() {
        let mut matrix = NdMatrix::<f64>::new(3, 3, 9.0);
        let input = "0,1,2.5\n\n2,2,-1e-3\n0,1,0.5\n";
        let pattern = read_sparse_matrix(Cursor::new(input), &mut matrix).unwrap();

        assert_eq!(pattern.nnz(), 2);
        assert!(pattern.contains(0, 1));
        assert!(pattern.contains(2, 2));
        assert_eq!(matrix.get_entry(0, 1), 3.0);
        assert_eq!(matrix.get_entry(2, 2), -1e-3);
        assert_eq!(matrix.get_entry(1, 1), 0.0);
    }

    #[test]
    fn test_read_out_of_range_leaves_matrix() {
        let mut matrix = NdMatrix::<f64>::new(2, 2, 1.0);
        let err = read_sparse_matrix(Cursor::new("0,0,1\n5,0,1\n"), &mut matrix).unwrap_err();
        assert!(matches!(
            err,
            Error::Container(LaconError::IndexOutOfRange { axis: Axis::Row, .. })
        ));
        assert_eq!(matrix.get_entry(0, 0), 1.0);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = read_triplets(Cursor::new("0,0,1\n1,x,2\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = read_triplets(Cursor::new("0,0\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));

        let err = read_triplets(Cursor::new("0,0,1,4\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_write_then_read() {
        let source = NdMatrix::<f64>::from_fn(4, 4, |row, col| {
            if row == col {
                1.0 / 3.0
            } else {
                0.0
            }
        });
        let pattern = SparsityPattern::full(4, 4)
            .compress(&source, 0.0)
            .unwrap();

        let mut buffer = Vec::new();
        write_sparse_matrix(&source, &pattern, &mut buffer).unwrap();

        let mut target = NdMatrix::<f64>::zeros(4, 4);
        let read = read_sparse_matrix(Cursor::new(buffer), &mut target).unwrap();
        assert_eq!(read, pattern);
        for i in 0..4 {
            assert!((target.get_entry(i, i) - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_raw_vector_maps_as_view() {
        use crate::NdMappedVector;

        let path = std::env::temp_dir().join(format!("lacon-raw-{}.bin", std::process::id()));
        write_raw_vector(&path, &[1.0f64, 2.0, 3.0]).unwrap();

        let mut mapped = NdMappedVector::<f64>::open(&path).unwrap();
        assert!(mapped.is_view());
        assert_eq!(mapped.to_vec(), vec![1.0, 2.0, 3.0]);

        mapped.set_entry(1, 5.0);
        assert!(!mapped.is_view());
        assert_eq!(mapped.to_vec(), vec![1.0, 5.0, 3.0]);

        let reopened = NdMappedVector::<f64>::open(&path).unwrap();
        assert_eq!(reopened.get_entry(1), 2.0);
        std::fs::remove_file(&path).unwrap();
    }
}
