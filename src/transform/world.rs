//! World transform cache
//!
//! A [`WorldTransformCache`] holds a node's composed world matrix and the
//! stamps of the parent and local transforms that produced it. Calling
//! [`WorldTransformCache::recompute`] every frame is cheap: when neither input
//! moved, the call is four integer comparisons and no matrix math.
//!
//! # Example
//!
//! ```ignore
//! let root = WorldTransformCache::identity();
//! let mut slot = None;
//! let local = LocalTransform::from_position(Vec3::X);
//!
//! let child = root.resolve_child_cache(&mut slot, &local);
//! assert!(child.was_updated());
//!
//! let child = root.resolve_child_cache(&mut slot, &local);
//! assert!(!child.was_updated()); // nothing changed, nothing recomputed
//! ```

use std::sync::OnceLock;

use glam::{Mat4, Vec3};

use super::memo::Memo;
use super::source::{OperationKind, TransformMatrix, TransformSource};
use crate::core::{Stamp, TransformId, Versioned};
use crate::geometry::{ArtifactSource, ComputedBounds, ComputedRaycast, Geometry, Raycast};

/// Which side of a surface faces the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

/// Stamps of the `(parent, local)` pair last consumed.
type InputKey = (Stamp, Stamp);

/// Cached world transform of one scene node.
#[derive(Debug, Clone)]
pub struct WorldTransformCache {
    id: TransformId,
    version: u64,

    /// Composed world matrix
    matrix: Mat4,
    /// Inverse of `matrix`, valid when `inverse_version == Some(version)`
    inverse: Mat4,
    inverse_version: Option<u64>,

    /// Last consumed (parent, local) stamps
    inputs: Memo<InputKey>,

    eye_vector: Option<Vec3>,
    updated: bool,
}

impl WorldTransformCache {
    /// Create a cache that has not consumed any input yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TransformId::next(),
            version: 0,
            matrix: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
            inverse_version: None,
            inputs: Memo::new(),
            eye_vector: None,
            updated: false,
        }
    }

    /// The shared identity transform used as the parent of scene roots.
    ///
    /// Its id and version never change, so roots recompute only when their
    /// own local transform moves.
    #[must_use]
    pub fn identity() -> &'static Self {
        static IDENTITY: OnceLock<WorldTransformCache> = OnceLock::new();
        IDENTITY.get_or_init(Self::new)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The composed world matrix.
    #[must_use]
    #[inline]
    pub fn world_matrix(&self) -> Mat4 {
        self.matrix
    }

    /// World-space position (translation column).
    #[must_use]
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Whether the last `recompute*` call produced a new matrix.
    #[must_use]
    #[inline]
    pub fn was_updated(&self) -> bool {
        self.updated
    }

    /// Raw bytes of the world matrix, column-major, for GPU upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.matrix)
    }

    // -------------------------------------------------------------------------
    // Recomputation
    // -------------------------------------------------------------------------

    /// Compose `parent * local` unless both inputs are unchanged since the
    /// last call.
    ///
    /// Returns `true` if the world matrix was recomputed.
    pub fn recompute<P, L>(&mut self, parent: &P, local: &L) -> bool
    where
        P: TransformSource + ?Sized,
        L: TransformSource + ?Sized,
    {
        if !self.inputs.observe((parent.stamp(), local.stamp())) {
            self.updated = false;
            return false;
        }

        let parent_matrix = parent.matrix().to_mat4();
        self.matrix = match local.kind() {
            OperationKind::Identity => parent_matrix,
            OperationKind::TranslationOnly => {
                translate(parent_matrix, local.matrix().translation())
            }
            OperationKind::Generic => parent_matrix * local.matrix().to_mat4(),
        };

        self.eye_vector = parent.eye_vector().or_else(|| local.eye_vector());
        self.mark_updated();
        true
    }

    /// Alias the world matrix of a single source.
    ///
    /// Both recorded stamps are set to the source's stamp, so a later
    /// [`recompute`](Self::recompute) with a real parent/local pair never
    /// mistakes this state for its own.
    pub fn recompute_from_single_source<S>(&mut self, source: &S) -> bool
    where
        S: TransformSource + ?Sized,
    {
        let stamp = source.stamp();
        if !self.inputs.observe((stamp, stamp)) {
            self.updated = false;
            return false;
        }

        self.matrix = source.matrix().to_mat4();
        self.eye_vector = source.eye_vector();
        self.mark_updated();
        true
    }

    fn mark_updated(&mut self) {
        self.updated = true;
        self.version += 1;
    }

    // -------------------------------------------------------------------------
    // Derived queries
    // -------------------------------------------------------------------------

    /// Inverse of the world matrix, computed at most once per version.
    ///
    /// Singular matrices are inverted as-is; the result is typically
    /// non-finite.
    pub fn inverse(&mut self) -> Mat4 {
        if self.inverse_version != Some(self.version) {
            self.inverse = self.matrix.inverse();
            self.inverse_version = Some(self.version);
        }
        self.inverse
    }

    /// Check whether the cached inverse is valid for the current version.
    #[must_use]
    pub fn has_current_inverse(&self) -> bool {
        self.inverse_version == Some(self.version)
    }

    /// Which side of the node's local XY plane faces `eye_vector`.
    pub fn visible_side(&mut self, eye_vector: Vec3) -> Side {
        let local_eye = self.inverse().project_point3(eye_vector);
        if local_eye.z > 0.0 { Side::Front } else { Side::Back }
    }

    // -------------------------------------------------------------------------
    // Child resolution
    // -------------------------------------------------------------------------

    /// Get or create the child cache in `slot`, then update it as
    /// `self * local`.
    pub fn resolve_child_cache<'a, L>(
        &self,
        slot: &'a mut Option<WorldTransformCache>,
        local: &L,
    ) -> &'a mut WorldTransformCache
    where
        L: TransformSource + ?Sized,
    {
        let child = slot.get_or_insert_with(Self::new);
        child.recompute(self, local);
        child
    }

    /// Get or create the child cache in `slot`, then update it as
    /// `local * self`.
    pub fn resolve_child_reverse_cache<'a, L>(
        &self,
        slot: &'a mut Option<WorldTransformCache>,
        local: &L,
    ) -> &'a mut WorldTransformCache
    where
        L: TransformSource + ?Sized,
    {
        let child = slot.get_or_insert_with(Self::new);
        child.recompute(local, self);
        child
    }

    /// Cheap check whether a reverse child would recompute.
    #[must_use]
    pub fn child_reverse_needs_update<L>(&self, child: Option<&WorldTransformCache>, local: &L) -> bool
    where
        L: TransformSource + ?Sized,
    {
        child.is_none_or(|child| !child.inputs.is_current(&(local.stamp(), self.stamp())))
    }

    /// Get or create the child cache in `slot` as an alias of `self`.
    pub fn resolve_single_child<'a>(
        &self,
        slot: &'a mut Option<WorldTransformCache>,
    ) -> &'a mut WorldTransformCache {
        let child = slot.get_or_insert_with(Self::new);
        child.recompute_from_single_source(self);
        child
    }

    /// Bring `geometry` into world space, reusing the cache in `slot`.
    ///
    /// Returns `None`, and empties the slot, when the geometry is missing or
    /// invalid.
    pub fn resolve_child_bounds<'a>(
        &mut self,
        slot: &'a mut Option<ComputedBounds>,
        geometry: Option<&Geometry>,
    ) -> Option<&'a mut ComputedBounds> {
        let Some(geometry) = geometry.filter(|g| g.is_valid()) else {
            *slot = None;
            return None;
        };
        let bounds = slot.get_or_insert_with(ComputedBounds::new);
        bounds.update_from(self, Some(geometry));
        Some(bounds)
    }

    /// Bring `raycast` into this node's local space, reusing the cache in
    /// `slot`.
    ///
    /// Takes `&mut self` because the local-space ray needs the inverse.
    pub fn resolve_child_raycast<'a>(
        &mut self,
        slot: &'a mut Option<ComputedRaycast>,
        raycast: Option<&Raycast>,
    ) -> Option<&'a mut ComputedRaycast> {
        let Some(raycast) = raycast else {
            *slot = None;
            return None;
        };
        let computed = slot.get_or_insert_with(ComputedRaycast::new);
        computed.update_from(self, Some(raycast));
        Some(computed)
    }
}

/// `matrix * translation(t)` without a full matrix product.
#[inline]
fn translate(matrix: Mat4, t: Vec3) -> Mat4 {
    let mut out = matrix;
    out.w_axis = matrix * t.extend(1.0);
    out
}

impl Default for WorldTransformCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Versioned for WorldTransformCache {
    fn id(&self) -> TransformId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl TransformSource for WorldTransformCache {
    fn kind(&self) -> OperationKind {
        OperationKind::Generic
    }

    fn matrix(&self) -> TransformMatrix {
        TransformMatrix::Affine3d(self.matrix)
    }

    fn eye_vector(&self) -> Option<Vec3> {
        self.eye_vector
    }
}
