//! `ndarray` implementations of the dense backend contracts

use alloc::vec::Vec;

use ndarray::{Array1, Array2};

use crate::traits::{MatrixBackend, MatrixElement, VectorBackend};

impl<T: MatrixElement> VectorBackend for Array1<T> {
    type Scalar = T;

    fn filled(len: usize, value: T) -> Self {
        Array1::from_elem(len, value)
    }

    fn from_values(values: &[T]) -> Self {
        Array1::from(Vec::from(values))
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn entry(&self, index: usize) -> T {
        self[index]
    }

    fn entry_mut(&mut self, index: usize) -> &mut T {
        &mut self[index]
    }

    fn scale(&mut self, alpha: T) {
        self.map_inplace(|value| *value *= alpha);
    }

    fn add_scaled(&mut self, alpha: T, other: &Self) {
        self.zip_mut_with(other, |value, &x| *value += alpha * x);
    }
}

impl<T: MatrixElement> MatrixBackend for Array2<T> {
    type Scalar = T;

    fn filled(rows: usize, cols: usize, value: T) -> Self {
        Array2::from_elem((rows, cols), value)
    }

    fn dims(&self) -> (usize, usize) {
        self.dim()
    }

    fn entry(&self, row: usize, col: usize) -> T {
        self[[row, col]]
    }

    fn entry_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self[[row, col]]
    }

    fn scale(&mut self, alpha: T) {
        self.map_inplace(|value| *value *= alpha);
    }

    fn add_scaled(&mut self, alpha: T, other: &Self) {
        self.zip_mut_with(other, |value, &x| *value += alpha * x);
    }

    fn apply<V>(&self, x: &V, y: &mut V)
    where
        V: VectorBackend<Scalar = T>,
    {
        for (row, lane) in self.outer_iter().enumerate() {
            let mut acc = T::zero();
            for (col, &value) in lane.iter().enumerate() {
                acc += value * x.entry(col);
            }
            *y.entry_mut(row) = acc;
        }
    }
}
