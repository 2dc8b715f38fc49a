use tracing::trace;

use crate::matrix::matrix_real::{MatrixReal, RealElement};

/// Anything that memoizes a value derived from mutable state implements this.
pub trait InvalidateCache {
    /// Drop every derived value so the next query recomputes it.
    fn invalidate_cache(&mut self);
}

impl<T: InvalidateCache + ?Sized> InvalidateCache for Box<T> {
    #[inline]
    fn invalidate_cache(&mut self) {
        (**self).invalidate_cache();
    }
}

/// A matrix together with a memoized inverse.
///
/// The cached inverse, when present, always belongs to the current value:
/// every `set` clears it, even if the new matrix equals the old one.
#[derive(Debug)]
pub struct CachedMatrix<T = f64> {
    value: MatrixReal<T>,
    cached_inverse: Option<MatrixReal<T>>,
}

impl<T: RealElement> CachedMatrix<T> {
    pub fn new(initial: MatrixReal<T>) -> Self {
        CachedMatrix {
            value: initial,
            cached_inverse: None,
        }
    }

    pub fn set(&mut self, new_value: MatrixReal<T>) {
        self.value = new_value;
        self.invalidate_cache();
    }

    pub fn get(&self) -> &MatrixReal<T> {
        &self.value
    }

    /// Stores `inv` as is. Whether it really is the inverse of the current
    /// value is up to the caller.
    pub fn set_cached_inverse(&mut self, inv: MatrixReal<T>) {
        self.cached_inverse = Some(inv);
    }

    pub fn get_cached_inverse(&self) -> Option<&MatrixReal<T>> {
        self.cached_inverse.as_ref()
    }

    pub fn is_cached(&self) -> bool {
        self.cached_inverse.is_some()
    }

    pub fn into_inner(self) -> MatrixReal<T> {
        self.value
    }
}

impl<T> InvalidateCache for CachedMatrix<T> {
    fn invalidate_cache(&mut self) {
        if self.cached_inverse.take().is_some() {
            trace!("cached inverse invalidated");
        }
    }
}

impl<T: RealElement> From<MatrixReal<T>> for CachedMatrix<T> {
    fn from(value: MatrixReal<T>) -> Self {
        CachedMatrix::new(value)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
