//! Lazily computed, explicitly invalidated scalar caches.
//!
//! A cached value is stored as the bit pattern of an `f32` inside an
//! `AtomicU32`, with a quiet-NaN pattern as the "not computed" sentinel.
//! Reads go through `&self` (peers are read concurrently under the
//! `parallel` feature), writes to the owning vector go through `&mut self`,
//! so a reader can never observe a cache racing with a component change.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

const UNSET: u32 = 0x7fc0_0000;

pub(crate) struct CachedScalar(AtomicU32);

impl CachedScalar {
    #[inline]
    pub(crate) const fn unset() -> Self {
        CachedScalar(AtomicU32::new(UNSET))
    }

    /// Return the cached value, computing and storing it first if unset.
    #[inline]
    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> f32) -> f32 {
        let bits = self.0.load(Ordering::Relaxed);
        if bits != UNSET {
            return f32::from_bits(bits);
        }
        let value = compute();
        self.0.store(value.to_bits(), Ordering::Relaxed);
        value
    }

    #[inline]
    pub(crate) fn set(&mut self, value: f32) {
        *self.0.get_mut() = value.to_bits();
    }

    #[inline]
    pub(crate) fn invalidate(&mut self) {
        *self.0.get_mut() = UNSET;
    }

    #[inline]
    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed) != UNSET
    }
}

impl Clone for CachedScalar {
    fn clone(&self) -> Self {
        CachedScalar(AtomicU32::new(self.0.load(Ordering::Relaxed)))
    }
}

impl Default for CachedScalar {
    fn default() -> Self {
        Self::unset()
    }
}

impl fmt::Debug for CachedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "{}", f32::from_bits(self.0.load(Ordering::Relaxed)))
        } else {
            f.write_str("<unset>")
        }
    }
}

/// Magnitude and squared magnitude of a vector, invalidated together.
#[derive(Clone, Default, Debug)]
pub(crate) struct MagnitudeCache {
    pub(crate) magnitude:         CachedScalar,
    pub(crate) magnitude_squared: CachedScalar,
}

impl MagnitudeCache {
    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.magnitude.invalidate();
        self.magnitude_squared.invalidate();
    }
}
