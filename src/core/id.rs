//! Identity and versioning for transform-bearing objects
//!
//! Every transform, geometry and ray carries a process-unique [`TransformId`]
//! and a version counter. Caches remember the [`Stamp`] of the inputs they
//! consumed and compare stamps instead of values.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique ids. Starts at 1, 0 is never handed out.
static NEXT_TRANSFORM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a versioned object.
///
/// Ids are never reused while the process runs. A `u64` counter incremented
/// once per allocation does not wrap in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(u64);

impl TransformId {
    /// Reserved id that no object ever receives.
    pub const NONE: Self = Self(0);

    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_TRANSFORM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TransformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The `(id, version)` pair identifying one exact state of a versioned object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp {
    pub id: TransformId,
    pub version: u64,
}

impl Stamp {
    /// Stamp that matches no live object.
    pub const NONE: Self = Self {
        id: TransformId::NONE,
        version: 0,
    };

    #[must_use]
    pub const fn new(id: TransformId, version: u64) -> Self {
        Self { id, version }
    }
}

/// Anything with an immutable id and a monotonically increasing version.
pub trait Versioned {
    /// The object's id, fixed at construction.
    fn id(&self) -> TransformId;

    /// Number of times the object's output has been recomputed.
    fn version(&self) -> u64;

    /// Current stamp of this object.
    fn stamp(&self) -> Stamp {
        Stamp::new(self.id(), self.version())
    }
}
