//! Scene node components

use glam::Mat4;

use crate::geometry::{Aabb, ComputedBounds, ComputedRaycast, Geometry};
use crate::transform::{LocalTransform, WorldTransformCache};

/// Transform state of one scene node
///
/// The world, bounds and raycast slots are filled lazily by propagation and
/// queries; each holds at most one cache that is reused across frames.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Local transform relative to the parent
    pub local: LocalTransform,
    pub(crate) world: Option<WorldTransformCache>,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) bounds: Option<ComputedBounds>,
    pub(crate) raycast: Option<ComputedRaycast>,
}

impl Node {
    #[must_use]
    pub fn new(local: LocalTransform) -> Self {
        Self {
            local,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// World cache, absent until the node has been propagated once
    #[must_use]
    pub fn world(&self) -> Option<&WorldTransformCache> {
        self.world.as_ref()
    }

    /// World matrix from the last propagation
    #[must_use]
    pub fn world_matrix(&self) -> Option<Mat4> {
        self.world.as_ref().map(WorldTransformCache::world_matrix)
    }

    #[must_use]
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Mutable geometry access; version bumps on edit invalidate the bounds
    pub fn geometry_mut(&mut self) -> Option<&mut Geometry> {
        self.geometry.as_mut()
    }

    /// World-space bounds from the last propagation
    #[must_use]
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.bounds.as_ref().and_then(|b| b.value()).copied()
    }
}

/// Name component for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
