//! Copy-on-write vector that starts out as a view over caller memory
//!
//! A [`MappedVector`] reads directly from memory it does not own: a borrowed
//! slice, a raw pointer range, or (with the `mmap` feature) a memory-mapped
//! file. The view survives sharing clones but never a write: the first
//! mutating access copies the data into an owned backend, so caller memory is
//! never written through the container.

use std::fmt;

#[cfg(feature = "mmap")]
use std::{fs::File, path::Path, sync::Arc};

use lacon_core::{
    cast_elements, check_shape, ContainerInterface, MatrixElement, Result, VectorBackend,
    VectorInterface, Zero,
};
#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use crate::handle::CowHandle;
use crate::vector::DenseVector;

/// Where the entries of a mapped vector live
#[derive(Clone)]
enum Storage<'a, B: VectorBackend> {
    /// Borrowed caller memory
    View(&'a [B::Scalar]),
    /// Read-only file mapping, validated for `B::Scalar` on open
    #[cfg(feature = "mmap")]
    File(Arc<Mmap>),
    /// Backend owned by the container
    Owned(B),
}

impl<B: VectorBackend> Storage<'_, B> {
    fn is_view(&self) -> bool {
        !matches!(self, Storage::Owned(_))
    }

    fn size(&self) -> usize {
        match self {
            Storage::View(values) => values.len(),
            #[cfg(feature = "mmap")]
            Storage::File(map) => file_values::<B::Scalar>(map).len(),
            Storage::Owned(backend) => backend.size(),
        }
    }

    fn entry(&self, index: usize) -> B::Scalar {
        match self {
            Storage::View(values) => values[index],
            #[cfg(feature = "mmap")]
            Storage::File(map) => file_values::<B::Scalar>(map)[index],
            Storage::Owned(backend) => backend.entry(index),
        }
    }

    fn to_backend(&self) -> B {
        match self {
            Storage::View(values) => B::from_values(values),
            #[cfg(feature = "mmap")]
            Storage::File(map) => B::from_values(file_values(map)),
            Storage::Owned(backend) => backend.clone(),
        }
    }
}

/// Element view of a mapping already validated by `MappedVector::open`
#[cfg(feature = "mmap")]
fn file_values<T: MatrixElement>(map: &Mmap) -> &[T] {
    bytemuck::cast_slice(&map[..])
}

/// Dense vector that may alias memory owned by the caller
///
/// Behaves exactly like [`DenseVector`] from the outside. Sharing clones keep
/// pointing at the same view; the first write on any of them detaches that
/// container into freshly allocated owned storage.
#[derive(Clone)]
pub struct MappedVector<'a, B: VectorBackend> {
    storage: CowHandle<Storage<'a, B>>,
}

impl<'a, B: VectorBackend> MappedVector<'a, B> {
    /// View `data` without copying it
    pub fn new(data: &'a [B::Scalar]) -> Self {
        Self::with_storage(Storage::View(data))
    }

    /// View `len` elements starting at `data` without copying them
    ///
    /// # Safety
    ///
    /// `data` must be valid for reads of `len` elements, properly aligned,
    /// and the memory must stay alive and unmodified for `'a`.
    pub unsafe fn from_raw_parts(data: *const B::Scalar, len: usize) -> Self {
        // SAFETY: upheld by the caller as documented above
        Self::new(unsafe { std::slice::from_raw_parts(data, len) })
    }

    /// View raw bytes as elements without copying them
    ///
    /// Fails with `Misaligned` if `bytes` is not aligned for the element type
    /// or its length is not a multiple of the element size.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        Ok(Self::new(cast_elements(bytes)?))
    }

    /// Create an owned vector of `size` entries equal to `value`
    pub fn with_size(size: usize, value: B::Scalar) -> Self {
        Self::wrap(B::filled(size, value))
    }

    /// Create an owned vector of `size` zeros
    pub fn zeros(size: usize) -> Self {
        Self::with_size(size, <B::Scalar as Zero>::zero())
    }

    /// Create an owned vector holding a copy of `values`
    pub fn from_values(values: &[B::Scalar]) -> Self {
        Self::wrap(B::from_values(values))
    }

    /// Create an owned vector holding a deep copy of `backend`
    pub fn from_backend(backend: &B) -> Self {
        Self::wrap(backend.clone())
    }

    /// Take ownership of a backend value
    pub fn wrap(backend: B) -> Self {
        Self::with_storage(Storage::Owned(backend))
    }

    /// Take ownership of a boxed backend
    pub fn adopt(backend: Box<B>) -> Self {
        Self::wrap(*backend)
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

    fn with_storage(storage: Storage<'a, B>) -> Self {
        Self {
            storage: CowHandle::new(storage),
        }
    }

    /// Replace the contents with a deep copy of `backend`
    pub fn assign_backend(&mut self, backend: &B) {
        *self = Self::from_backend(backend);
    }

    /// Whether the entries still live in memory the container does not own
    pub fn is_view(&self) -> bool {
        self.storage.get().is_view()
    }

    /// Whether no other container shares this vector's storage
    pub fn is_uniquely_owned(&self) -> bool {
        self.storage.is_uniquely_owned()
    }

    /// Whether `self` and `other` currently share one storage
    pub fn shares_backend_with(&self, other: &Self) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// Mutable access to an owned backend; detaches views and sharers first
    pub fn backend_mut(&mut self) -> &mut B {
        self.ensure_uniqueness()
    }

    /// Number of entries
    pub fn size(&self) -> usize {
        self.storage.get().size()
    }

    /// Whether the vector has no entries
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Entry at `index`, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<B::Scalar> {
        (index < self.size()).then(|| self.storage.get().entry(index))
    }

    /// Entry at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn get_entry(&self, index: usize) -> B::Scalar {
        self.assert_in_range(index);
        self.storage.get().entry(index)
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
        let source = other.storage.get();
        let target = self.ensure_uniqueness();
        for index in 0..source.size() {
            *target.entry_mut(index) += alpha * source.entry(index);
        }
        Ok(())
    }

    /// Whether both vectors have the same length
    pub fn has_equal_shape(&self, other: &Self) -> bool {
        self.size() == other.size()
    }

    /// Deep copy into owned storage sharing nothing with `self`
    pub fn copy(&self) -> Self {
        Self::wrap(self.storage.get().to_backend())
    }

    /// Iterate over the entries
    pub fn iter(&self) -> impl Iterator<Item = B::Scalar> + '_ {
        let storage = self.storage.get();
        (0..storage.size()).map(move |index| storage.entry(index))
    }

    /// Collect the entries into a `Vec`
    pub fn to_vec(&self) -> Vec<B::Scalar> {
        self.iter().collect()
    }

    /// Convert into a [`DenseVector`], copying only views and shared storage
    pub fn into_dense(self) -> DenseVector<B> {
        match self.storage.into_inner() {
            Storage::Owned(backend) => DenseVector::wrap(backend),
            view => DenseVector::wrap(view.to_backend()),
        }
    }

    fn assert_in_range(&self, index: usize) {
        let size = self.size();
        assert!(
            index < size,
            "index {index} out of range for vector of size {size}"
        );
    }

    fn ensure_uniqueness(&mut self) -> &mut B {
        let storage = self.storage.get_mutable();
        if storage.is_view() {
            debug!(size = storage.size(), "detaching mapped vector from borrowed memory");
            *storage = Storage::Owned(storage.to_backend());
        }
        match storage {
            Storage::Owned(backend) => backend,
            _ => unreachable!("view storage was detached above"),
        }
    }
}

#[cfg(feature = "mmap")]
impl<B: VectorBackend> MappedVector<'static, B> {
    /// Map a file of native-endian elements as a read-only view
    ///
    /// The file is never written: the first mutation copies its contents into
    /// owned storage.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = File::open(path)?;
        // SAFETY: read-only mapping; the contents are copied before any write
        let map = unsafe { MmapOptions::new().map(&file)? };
        cast_elements::<B::Scalar>(&map)?;
        debug!(bytes = map.len(), "mapped vector file");
        Ok(Self::with_storage(Storage::File(Arc::new(map))))
    }
}

impl<B: VectorBackend> PartialEq for MappedVector<'_, B> {
    fn eq(&self, other: &Self) -> bool {
        self.has_equal_shape(other) && self.iter().eq(other.iter())
    }
}

impl<B: VectorBackend> fmt::Debug for MappedVector<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedVector")
            .field("data_type", &<B::Scalar as MatrixElement>::data_type())
            .field("view", &self.is_view())
            .field("values", &self.to_vec())
            .finish()
    }
}

impl<B: VectorBackend> VectorInterface for MappedVector<'_, B> {
    type Scalar = B::Scalar;

    fn size(&self) -> usize {
        MappedVector::size(self)
    }

    fn get_entry(&self, index: usize) -> B::Scalar {
        MappedVector::get_entry(self, index)
    }

    fn set_entry(&mut self, index: usize, value: B::Scalar) {
        MappedVector::set_entry(self, index, value)
    }

    fn add_to_entry(&mut self, index: usize, value: B::Scalar) {
        MappedVector::add_to_entry(self, index, value)
    }
}

impl<B: VectorBackend> ContainerInterface for MappedVector<'_, B> {
    type Scalar = B::Scalar;

    fn copy(&self) -> Self {
        MappedVector::copy(self)
    }

    fn scal(&mut self, alpha: B::Scalar) {
        MappedVector::scal(self, alpha)
    }

    fn axpy(&mut self, alpha: B::Scalar, other: &Self) -> Result<()> {
        MappedVector::axpy(self, alpha, other)
    }

    fn has_equal_shape(&self, other: &Self) -> bool {
        MappedVector::has_equal_shape(self, other)
    }
}

#[cfg(test)]
mod tests {
    use crate::NdMappedVector;
    use lacon_core::LaconError;

    #[test]
    fn test_view_reads_caller_memory() {
        let buf = vec![1.0, 2.0, 3.0];
        let v = NdMappedVector::<f64>::new(&buf);
        assert!(v.is_view());
        assert_eq!(v.size(), 3);
        assert_eq!(v.get_entry(2), 3.0);
        assert_eq!(v.to_vec(), buf);
    }

    #[test]
    fn test_view_severs_on_write() {
        let buf = vec![1.0, 2.0, 3.0];
        let mut v = NdMappedVector::<f64>::new(&buf);
        assert!(v.is_uniquely_owned());

        v.set_entry(1, 20.0);
        assert!(!v.is_view());
        assert_eq!(v.get_entry(1), 20.0);
        assert_eq!(buf, vec![1.0, 2.0, 3.0]);

        // Later writes stay in the owned copy
        v.scal(2.0);
        assert_eq!(v.to_vec(), vec![2.0, 40.0, 6.0]);
        assert_eq!(buf, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_raw_parts_view_is_never_written() {
        let mut buf = [0.5f64; 4];
        let ptr = buf.as_ptr();
        {
            // SAFETY: buf outlives the vector and is not touched while it lives
            let mut v = unsafe { NdMappedVector::<f64>::from_raw_parts(ptr, buf.len()) };
            v.add_to_entry(0, 1.0);
            assert_eq!(v.get_entry(0), 1.5);
        }
        assert_eq!(buf, [0.5; 4]);
        buf[0] = 2.0;
        assert_eq!(buf[0], 2.0);
    }

    #[test]
    fn test_clone_shares_view_until_write() {
        let buf = vec![1.0, 2.0];
        let a = NdMappedVector::<f64>::new(&buf);
        let mut b = a.clone();
        assert!(a.shares_backend_with(&b));
        assert!(b.is_view());

        b.set_entry(0, 7.0);
        assert!(!a.shares_backend_with(&b));
        assert!(a.is_view());
        assert!(!b.is_view());
        assert_eq!(a.to_vec(), vec![1.0, 2.0]);
        assert_eq!(b.to_vec(), vec![7.0, 2.0]);
    }

    #[test]
    fn test_owned_constructors() {
        let v = NdMappedVector::<f64>::with_size(3, 2.0);
        assert!(!v.is_view());
        assert_eq!(v.to_vec(), vec![2.0; 3]);

        let backend = ndarray::Array1::from(vec![1.0, 2.0]);
        let w = NdMappedVector::from_backend(&backend);
        assert!(!w.is_view());
        assert_eq!(w.to_vec(), vec![1.0, 2.0]);

        let mut x = NdMappedVector::<f64>::zeros(1);
        x.assign_backend(&backend);
        assert_eq!(x, w);
        assert!(!x.shares_backend_with(&w));
    }

    #[test]
    fn test_copy_detaches_from_view() {
        let buf = vec![4.0, 5.0];
        let v = NdMappedVector::<f64>::new(&buf);
        let c = v.copy();
        assert!(!c.is_view());
        assert!(v.is_view());
        assert_eq!(c, v);
    }

    #[test]
    fn test_axpy() {
        let buf = vec![1.0, 1.0];
        let mut y = NdMappedVector::<f64>::new(&buf);
        let x = NdMappedVector::<f64>::from_values(&[2.0, 3.0]);
        y.axpy(0.5, &x).unwrap();
        assert_eq!(y.to_vec(), vec![2.0, 2.5]);
        assert_eq!(buf, vec![1.0, 1.0]);

        let z = NdMappedVector::<f64>::from_values(&[1.0]);
        assert!(matches!(
            y.axpy(1.0, &z),
            Err(LaconError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_bytes() {
        let values = [1.0f64, 2.0];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let v = NdMappedVector::<f64>::from_bytes(bytes).unwrap();
        assert_eq!(v.to_vec(), vec![1.0, 2.0]);
        assert_eq!(
            NdMappedVector::<f64>::from_bytes(&bytes[..5]).unwrap_err(),
            LaconError::Misaligned
        );
    }

    #[test]
    fn test_into_dense() {
        let buf = vec![3.0, 4.0];
        let dense = NdMappedVector::<f64>::new(&buf).into_dense();
        assert_eq!(dense.to_vec(), buf);
    }

    #[test]
    fn test_empty_view() {
        let buf: Vec<f64> = Vec::new();
        let v = NdMappedVector::<f64>::new(&buf);
        assert!(v.is_empty());
        assert_eq!(v.get(0), None);
    }

    #[test]
    fn test_adopt_and_from_raw_take_ownership() {
        let adopted = NdMappedVector::adopt(Box::new(ndarray::Array1::from(vec![1.0f64, 2.0])));
        assert!(!adopted.is_view());
        assert!(adopted.is_uniquely_owned());
        assert_eq!(adopted.to_vec(), vec![1.0, 2.0]);

        let raw = Box::into_raw(Box::new(ndarray::Array1::from(vec![6.0f64])));
        // SAFETY: pointer comes from Box::into_raw and is not reused
        let mut v = unsafe { NdMappedVector::<f64>::from_raw(raw) };
        assert!(!v.is_view());
        v.add_to_entry(0, 1.0);
        assert_eq!(v.get_entry(0), 7.0);
    }
}
