//! Artifacts derived from a world transform
//!
//! Bounds and local-space rays are both functions of an owner's world matrix
//! and some static source data. [`DerivedCache`] memoizes them the same way
//! the world cache memoizes composition: on stamps, never on values.

use std::fmt;

use crate::core::{Stamp, TransformId, Versioned};
use crate::transform::{Memo, WorldTransformCache};

/// Static data that can be brought into an owner's space.
pub trait ArtifactSource: Versioned {
    /// The derived value.
    type Output: Clone + fmt::Debug;

    /// Invalid sources resolve to an absent artifact.
    fn is_valid(&self) -> bool {
        true
    }

    /// Apply the owner's transform to the untransformed source data.
    fn apply_transform(&self, owner: &mut WorldTransformCache) -> Self::Output;
}

/// `(owner, source, own version at sync)`
type SyncKey = (Stamp, Stamp, u64);

/// A cached value derived from an owner transform and a source.
///
/// Recomputation is skipped only when the owner's stamp, the source's stamp
/// and this artifact's own version all match what was recorded at the last
/// sync. The artifact can be moved between owners freely.
pub struct DerivedCache<S: ArtifactSource> {
    id: TransformId,
    version: u64,
    value: Option<S::Output>,
    synced: Memo<SyncKey>,
    updated: bool,
}

impl<S: ArtifactSource> DerivedCache<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TransformId::next(),
            version: 0,
            value: None,
            synced: Memo::new(),
            updated: false,
        }
    }

    /// The derived value; `None` means the node should be skipped.
    #[must_use]
    pub fn value(&self) -> Option<&S::Output> {
        self.value.as_ref()
    }

    /// Whether the last [`update_from`](Self::update_from) changed the value.
    #[must_use]
    pub fn was_updated(&self) -> bool {
        self.updated
    }

    /// Mutable access to the derived value.
    ///
    /// Bumps the version, so the next [`update_from`](Self::update_from)
    /// recomputes regardless of owner and source.
    pub fn value_mut(&mut self) -> Option<&mut S::Output> {
        self.version += 1;
        self.value.as_mut()
    }

    /// Check whether the value is current for `owner` and `source`.
    #[must_use]
    pub fn is_synced_with(&self, owner: &WorldTransformCache, source: &S) -> bool {
        self.synced.is_current(&(owner.stamp(), source.stamp(), self.version))
    }

    /// Forget the last sync, e.g. when the artifact is rebound from a pool.
    pub fn invalidate(&mut self) {
        self.synced.clear();
    }

    /// Bring the artifact up to date with `owner` and `source`.
    ///
    /// Returns `true` if the value changed, including the transition to
    /// absent when `source` is missing or invalid.
    pub fn update_from(&mut self, owner: &mut WorldTransformCache, source: Option<&S>) -> bool {
        let Some(source) = source.filter(|s| s.is_valid()) else {
            self.synced.clear();
            self.updated = self.value.take().is_some();
            if self.updated {
                self.version += 1;
            }
            return self.updated;
        };

        if self.is_synced_with(owner, source) {
            self.updated = false;
            return false;
        }

        self.value = Some(source.apply_transform(owner));
        self.version += 1;
        self.synced.record((owner.stamp(), source.stamp(), self.version));
        self.updated = true;
        true
    }
}

impl<S: ArtifactSource> Default for DerivedCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ArtifactSource> Clone for DerivedCache<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            version: self.version,
            value: self.value.clone(),
            synced: self.synced,
            updated: self.updated,
        }
    }
}

impl<S: ArtifactSource> fmt::Debug for DerivedCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedCache")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<S: ArtifactSource> Versioned for DerivedCache<S> {
    fn id(&self) -> TransformId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
