//! Version-stamped memoization
//!
//! A [`Memo`] remembers the key of the last input it was computed from.
//! Transform, bounds and raycast caches all gate recomputation through it, so
//! the stamp comparison lives in one place.

/// Last key observed by a memoized computation.
///
/// Starts empty, so the first observation is always a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memo<K> {
    last: Option<K>,
}

impl<K: Copy + Eq> Memo<K> {
    /// Create an empty memo.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Check whether `key` is exactly the last recorded key.
    #[must_use]
    #[inline]
    pub fn is_current(&self, key: &K) -> bool {
        self.last.as_ref() == Some(key)
    }

    /// Record `key` as consumed.
    #[inline]
    pub fn record(&mut self, key: K) {
        self.last = Some(key);
    }

    /// Record `key` and report whether it differs from the previous one.
    ///
    /// Returns `false` when the cached output is still valid for `key`.
    #[inline]
    pub fn observe(&mut self, key: K) -> bool {
        if self.is_current(&key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    /// Forget the recorded key; the next observation misses.
    #[inline]
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// The last recorded key, if any.
    #[must_use]
    #[inline]
    pub fn last(&self) -> Option<&K> {
        self.last.as_ref()
    }
}

impl<K: Copy + Eq> Default for Memo<K> {
    fn default() -> Self {
        Self::new()
    }
}
