//! Geometry source data and world-space bounds

use glam::Vec3;

use super::aabb::Aabb;
use super::derived::{ArtifactSource, DerivedCache};
use crate::core::{TransformId, Versioned};
use crate::transform::WorldTransformCache;

/// World-space bounds of a node's geometry.
pub type ComputedBounds = DerivedCache<Geometry>;

/// Untransformed vertex data of a node.
///
/// Geometry with no vertices, or with non-finite vertices, is invalid and
/// produces no bounds.
#[derive(Debug, Clone)]
pub struct Geometry {
    id: TransformId,
    version: u64,
    vertices: Vec<Vec3>,
    local_bounds: Option<Aabb>,
    valid: bool,
}

impl Geometry {
    /// Create from local-space vertices.
    #[must_use]
    pub fn new(vertices: Vec<Vec3>) -> Self {
        let mut geometry = Self {
            id: TransformId::next(),
            version: 0,
            vertices: Vec::new(),
            local_bounds: None,
            valid: false,
        };
        geometry.assign(vertices);
        geometry
    }

    /// An axis-aligned box given by its corners.
    #[must_use]
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        Self::new(Aabb::new(min, max).corners().to_vec())
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Bounds in the geometry's own space.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.local_bounds
    }

    /// Vertex positions as raw bytes for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Replace the vertex data.
    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) {
        self.assign(vertices);
        self.version += 1;
    }

    /// Mark the geometry unusable without dropping its data.
    pub fn invalidate(&mut self) {
        if self.valid {
            self.valid = false;
            self.version += 1;
        }
    }

    fn assign(&mut self, vertices: Vec<Vec3>) {
        self.valid = !vertices.is_empty() && vertices.iter().all(|v| v.is_finite());
        self.local_bounds = Aabb::from_points(vertices.iter().copied());
        self.vertices = vertices;
    }
}

impl Versioned for Geometry {
    fn id(&self) -> TransformId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl ArtifactSource for Geometry {
    type Output = Aabb;

    fn is_valid(&self) -> bool {
        self.valid
    }

    /// Fit the box around every transformed vertex, which is tighter than
    /// transforming the local box.
    fn apply_transform(&self, owner: &mut WorldTransformCache) -> Aabb {
        let matrix = owner.world_matrix();
        Aabb::from_transformed_points(&self.vertices, &matrix)
            .unwrap_or_else(|| Aabb::new(Vec3::ZERO, Vec3::ZERO))
    }
}
