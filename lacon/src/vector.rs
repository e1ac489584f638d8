//! Owned copy-on-write dense vector

use std::fmt;
use std::sync::Arc;

use lacon_core::{
    check_shape, ContainerInterface, MatrixElement, Result, VectorBackend, VectorInterface, Zero,
};

use crate::handle::CowHandle;

/// Dense vector over a backend it allocated itself
///
/// Cloning shares the backend; the first mutation after a clone gives the
/// mutated vector its own copy, so clones behave as independent values.
#[derive(Clone)]
pub struct DenseVector<B: VectorBackend> {
    backend: CowHandle<B>,
}

impl<B: VectorBackend> DenseVector<B> {
    /// Create a vector of `size` entries, all equal to `value`
    pub fn new(size: usize, value: B::Scalar) -> Self {
        Self::wrap(B::filled(size, value))
    }

    /// Create a vector of `size` zeros
    pub fn zeros(size: usize) -> Self {
        Self::new(size, <B::Scalar as Zero>::zero())
    }

    /// Create a vector holding a copy of `values`
    pub fn from_values(values: &[B::Scalar]) -> Self {
        Self::wrap(B::from_values(values))
    }

    /// Create a vector holding a deep copy of `backend`
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

    /// Whether no other container shares this vector's backend
    pub fn is_uniquely_owned(&self) -> bool {
        self.backend.is_uniquely_owned()
    }

    /// Whether `self` and `other` currently share one backend
    pub fn shares_backend_with(&self, other: &Self) -> bool {
        self.backend.ptr_eq(&other.backend)
    }

    /// Number of entries
    pub fn size(&self) -> usize {
        self.backend().size()
    }

    /// Whether the vector has no entries
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Entry at `index`, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<B::Scalar> {
        (index < self.size()).then(|| self.backend().entry(index))
    }

    /// Entry at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn get_entry(&self, index: usize) -> B::Scalar {
        self.assert_in_range(index);
        self.backend().entry(index)
    }

    /// Overwrite the entry at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn set_entry(&mut self, index: usize, value: B::Scalar) {
        self.assert_in_range(index);
        *self.ensure_uniqueness().entry_mut(index) = value;
    }

    /// Add `value` to the entry at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn add_to_entry(&mut self, index: usize, value: B::Scalar) {
        self.assert_in_range(index);
        *self.ensure_uniqueness().entry_mut(index) += value;
    }

    /// Multiply every entry by `alpha`
    pub fn scal(&mut self, alpha: B::Scalar) {
        self.ensure_uniqueness().scale(alpha);
    }

    /// `self += alpha * other`
    pub fn axpy(&mut self, alpha: B::Scalar, other: &Self) -> Result<()> {
        check_shape((self.size(), 1), (other.size(), 1))?;
        // Plain read of the other backend: it never has to diverge.
        let source = other.backend();
        self.ensure_uniqueness().add_scaled(alpha, source);
        Ok(())
    }

    /// Whether both vectors have the same length
    pub fn has_equal_shape(&self, other: &Self) -> bool {
        self.size() == other.size()
    }

    /// Deep copy sharing no storage with `self`
    pub fn copy(&self) -> Self {
        Self {
            backend: self.backend.deep_copy(),
        }
    }

    /// Iterate over the entries
    pub fn iter(&self) -> impl Iterator<Item = B::Scalar> + '_ {
        let backend = self.backend();
        (0..backend.size()).map(move |index| backend.entry(index))
    }

    /// Collect the entries into a `Vec`
    pub fn to_vec(&self) -> Vec<B::Scalar> {
        self.iter().collect()
    }

    fn assert_in_range(&self, index: usize) {
        let size = self.size();
        assert!(
            index < size,
            "index {index} out of range for vector of size {size}"
        );
    }

    fn ensure_uniqueness(&mut self) -> &mut B {
        self.backend.get_mutable()
    }
}

impl<B: VectorBackend> From<Vec<B::Scalar>> for DenseVector<B> {
    fn from(values: Vec<B::Scalar>) -> Self {
        Self::from_values(&values)
    }
}

impl<B: VectorBackend> From<&[B::Scalar]> for DenseVector<B> {
    fn from(values: &[B::Scalar]) -> Self {
        Self::from_values(values)
    }
}

impl<B: VectorBackend> FromIterator<B::Scalar> for DenseVector<B> {
    fn from_iter<I: IntoIterator<Item = B::Scalar>>(iter: I) -> Self {
        let values: Vec<_> = iter.into_iter().collect();
        Self::from_values(&values)
    }
}

impl<B: VectorBackend> PartialEq for DenseVector<B> {
    fn eq(&self, other: &Self) -> bool {
        self.has_equal_shape(other) && self.iter().eq(other.iter())
    }
}

impl<B: VectorBackend> fmt::Debug for DenseVector<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseVector")
            .field("data_type", &<B::Scalar as MatrixElement>::data_type())
            .field("values", &self.to_vec())
            .finish()
    }
}

impl<B: VectorBackend> fmt::Display for DenseVector<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, value) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

impl<B: VectorBackend> VectorInterface for DenseVector<B> {
    type Scalar = B::Scalar;

    fn size(&self) -> usize {
        DenseVector::size(self)
    }

    fn get_entry(&self, index: usize) -> B::Scalar {
        DenseVector::get_entry(self, index)
    }

    fn set_entry(&mut self, index: usize, value: B::Scalar) {
        DenseVector::set_entry(self, index, value)
    }

    fn add_to_entry(&mut self, index: usize, value: B::Scalar) {
        DenseVector::add_to_entry(self, index, value)
    }
}

impl<B: VectorBackend> ContainerInterface for DenseVector<B> {
    type Scalar = B::Scalar;

    fn copy(&self) -> Self {
        DenseVector::copy(self)
    }

    fn scal(&mut self, alpha: B::Scalar) {
        DenseVector::scal(self, alpha)
    }

    fn axpy(&mut self, alpha: B::Scalar, other: &Self) -> Result<()> {
        DenseVector::axpy(self, alpha, other)
    }

    fn has_equal_shape(&self, other: &Self) -> bool {
        DenseVector::has_equal_shape(self, other)
    }
}

#[cfg(test)]
mod tests {
    use crate::NdVector;
    use lacon_core::LaconError;

    #[test]
    fn test_round_trip_construction() {
        for n in [0usize, 1, 100] {
            let values: Vec<f64> = (0..n).map(|i| i as f64 * 0.25 - 3.0).collect();
            let vector = NdVector::<f64>::from_values(&values);
            assert_eq!(vector.size(), n);
            for (i, &value) in values.iter().enumerate() {
                assert_eq!(vector.get_entry(i), value);
            }
        }
    }

    #[test]
    fn test_new_fills_value() {
        let vector = NdVector::<f32>::new(4, 1.5);
        assert_eq!(vector.to_vec(), vec![1.5; 4]);
        assert!(NdVector::<f64>::zeros(3).iter().all(|v| v == 0.0));
    }

    #[test]
    fn test_value_independence() {
        let mut a: NdVector<f64> = vec![1.0, 2.0, 3.0].into();
        let mut b = a.clone();
        assert!(a.shares_backend_with(&b));

        b.set_entry(0, 9.0);
        assert!(!a.shares_backend_with(&b));
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(b.to_vec(), vec![9.0, 2.0, 3.0]);

        a.scal(2.0);
        assert_eq!(a.to_vec(), vec![2.0, 4.0, 6.0]);
        assert_eq!(b.to_vec(), vec![9.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reads_do_not_diverge() {
        let a: NdVector<f64> = vec![1.0, 2.0].into();
        let b = a.clone();
        let _ = b.get_entry(1);
        let _ = b.to_vec();
        assert!(a.shares_backend_with(&b));
    }

    #[test]
    fn test_axpy() {
        let mut y: NdVector<f64> = vec![1.0, 1.0, 1.0].into();
        let x: NdVector<f64> = vec![1.0, 2.0, 3.0].into();
        let x_share = x.clone();

        y.axpy(2.0, &x).unwrap();
        assert_eq!(y.to_vec(), vec![3.0, 5.0, 7.0]);
        assert!(x.shares_backend_with(&x_share));

        let short: NdVector<f64> = vec![1.0].into();
        assert_eq!(
            y.axpy(1.0, &short),
            Err(LaconError::ShapeMismatch {
                expected: (3, 1),
                found: (1, 1)
            })
        );
        assert_eq!(y.to_vec(), vec![3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_axpy_with_self_share() {
        let mut a: NdVector<f64> = vec![1.0, 2.0].into();
        let b = a.clone();
        a.axpy(1.0, &b).unwrap();
        assert_eq!(a.to_vec(), vec![2.0, 4.0]);
        assert_eq!(b.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_copy_and_assign_backend() {
        let a: NdVector<f64> = vec![1.0, 2.0].into();
        let b = a.copy();
        assert!(!a.shares_backend_with(&b));
        assert_eq!(a, b);

        let mut c = NdVector::<f64>::zeros(1);
        c.assign_backend(a.backend());
        assert!(!c.shares_backend_with(&a));
        assert_eq!(c, a);
    }

    #[test]
    fn test_add_to_entry_and_get() {
        let mut v = NdVector::<f64>::zeros(2);
        v.add_to_entry(1, 0.5);
        v.add_to_entry(1, 0.25);
        assert_eq!(v.get(1), Some(0.75));
        assert_eq!(v.get(2), None);
        assert_eq!(v.to_string(), "[0, 0.75]");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_entry_out_of_range_panics() {
        let v = NdVector::<f64>::zeros(2);
        v.get_entry(2);
    }

    #[test]
    fn test_adopt_takes_ownership() {
        let raw = Box::into_raw(Box::new(ndarray::Array1::from(vec![4.0f64, 5.0])));
        // SAFETY: pointer comes from Box::into_raw and is not reused
        let v = unsafe { NdVector::<f64>::from_raw(raw) };
        assert!(v.is_uniquely_owned());
        assert_eq!(v.to_vec(), vec![4.0, 5.0]);
    }
}
