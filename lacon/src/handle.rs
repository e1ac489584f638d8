//! Shared copy-on-write backend handle
//!
//! Every container stores its backend behind a [`CowHandle`]. Cloning the
//! handle shares the backend; [`CowHandle::get_mutable`] is the single place
//! where a shared backend diverges into a private deep copy.

use std::sync::Arc;

use tracing::debug;

/// Reference-counted handle with clone-on-write access
#[derive(Debug)]
pub struct CowHandle<B> {
    inner: Arc<B>,
}

impl<B> CowHandle<B> {
    /// Wrap a freshly allocated backend
    pub fn new(backend: B) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Take ownership of a boxed backend
    pub fn adopt(backend: Box<B>) -> Self {
        Self {
            inner: Arc::from(backend),
        }
    }

    /// Join an existing shared backend without copying it
    pub fn from_shared(backend: Arc<B>) -> Self {
        Self { inner: backend }
    }

    /// Whether no other handle refers to the same backend
    pub fn is_uniquely_owned(&self) -> bool {
        Arc::strong_count(&self.inner) == 1 && Arc::weak_count(&self.inner) == 0
    }

    /// Number of handles sharing this backend
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether both handles point to the same backend allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read access; never copies
    pub fn get(&self) -> &B {
        &self.inner
    }
}

impl<B: Clone> CowHandle<B> {
    /// Mutable access, deep-copying the backend first if it is shared
    pub fn get_mutable(&mut self) -> &mut B {
        if !self.is_uniquely_owned() {
            debug!(
                share_count = self.share_count(),
                "backend shared, diverging into private copy"
            );
        }
        Arc::make_mut(&mut self.inner)
    }

    /// Unwrap the backend, cloning it only if it is still shared
    pub fn into_inner(self) -> B {
        Arc::try_unwrap(self.inner).unwrap_or_else(|shared| B::clone(&shared))
    }

    /// New handle to a deep copy of the backend
    pub fn deep_copy(&self) -> Self {
        Self::new(B::clone(&self.inner))
    }
}

impl<B> Clone for CowHandle<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_until_write() {
        let mut a = CowHandle::new(vec![1.0, 2.0]);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.is_uniquely_owned());
        assert_eq!(a.share_count(), 2);

        a.get_mutable()[0] = 10.0;
        assert!(!a.ptr_eq(&b));
        assert!(a.is_uniquely_owned());
        assert!(b.is_uniquely_owned());
        assert_eq!(b.get(), &vec![1.0, 2.0]);
        assert_eq!(a.get(), &vec![10.0, 2.0]);
    }

    #[test]
    fn test_unique_write_is_in_place() {
        let mut a = CowHandle::new(vec![0u8; 4]);
        let before = a.get().as_ptr();
        a.get_mutable()[3] = 1;
        assert_eq!(a.get().as_ptr(), before);
    }

    #[test]
    fn test_deep_copy_and_adopt() {
        let a = CowHandle::adopt(Box::new(vec![3.0f64]));
        let b = a.deep_copy();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.get(), b.get());

        let backend = Arc::new(vec![1.0f64]);
        let c = CowHandle::from_shared(Arc::clone(&backend));
        assert_eq!(c.share_count(), 2);
        drop(backend);
        assert!(c.is_uniquely_owned());
    }
}
