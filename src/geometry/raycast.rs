//! Raycast source and per-node local-space rays

use super::derived::{ArtifactSource, DerivedCache};
use super::ray::Ray;
use crate::core::{TransformId, Versioned};
use crate::transform::WorldTransformCache;

/// A world-space ray brought into one node's local space.
pub type ComputedRaycast = DerivedCache<Raycast>;

/// A world-space ray shared by every node tested in one query.
#[derive(Debug, Clone)]
pub struct Raycast {
    id: TransformId,
    version: u64,
    ray: Ray,
}

impl Raycast {
    #[must_use]
    pub fn new(ray: Ray) -> Self {
        Self {
            id: TransformId::next(),
            version: 0,
            ray,
        }
    }

    #[must_use]
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Aim the ray somewhere else; every node's local ray goes stale.
    pub fn set_ray(&mut self, ray: Ray) {
        if self.ray != ray {
            self.ray = ray;
            self.version += 1;
        }
    }
}

impl Versioned for Raycast {
    fn id(&self) -> TransformId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl ArtifactSource for Raycast {
    type Output = Ray;

    fn is_valid(&self) -> bool {
        self.ray.origin.is_finite() && self.ray.direction.is_finite()
    }

    fn apply_transform(&self, owner: &mut WorldTransformCache) -> Ray {
        self.ray.transform(&owner.inverse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::LocalTransform;
    use glam::{Quat, Vec3};

    #[test]
    fn test_ray_in_local_space() {
        let local = LocalTransform::from_parts(
            Vec3::new(5.0, 0.0, 0.0),
            Quat::IDENTITY,
            Vec3::splat(2.0),
        );
        let mut owner = WorldTransformCache::new();
        owner.recompute(WorldTransformCache::identity(), &local);

        let raycast = Raycast::new(Ray::new(Vec3::new(5.0, 0.0, -10.0), Vec3::Z));
        let mut computed = ComputedRaycast::new();
        assert!(computed.update_from(&mut owner, Some(&raycast)));

        let local_ray = computed.value().unwrap();
        assert!(local_ray.origin.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
        assert!(local_ray.direction.abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-5));

        // Same parameter, same world point
        let world = owner.world_matrix().transform_point3(local_ray.point_at(10.0));
        assert!(world.abs_diff_eq(raycast.ray().point_at(10.0), 1e-4));
    }

    #[test]
    fn test_moving_the_ray_recomputes() {
        let mut owner = WorldTransformCache::new();
        owner.recompute(WorldTransformCache::identity(), &LocalTransform::new());

        let mut raycast = Raycast::new(Ray::new(Vec3::ZERO, Vec3::X));
        let mut computed = ComputedRaycast::new();
        computed.update_from(&mut owner, Some(&raycast));
        assert!(!computed.update_from(&mut owner, Some(&raycast)));

        raycast.set_ray(Ray::new(Vec3::ONE, Vec3::X));
        assert!(computed.update_from(&mut owner, Some(&raycast)));
        assert_eq!(computed.value().unwrap().origin, Vec3::ONE);
    }

    #[test]
    fn test_missing_raycast_is_absent() {
        let mut owner = WorldTransformCache::new();
        owner.recompute(WorldTransformCache::identity(), &LocalTransform::new());

        let mut slot = None;
        assert!(owner.resolve_child_raycast(&mut slot, None).is_none());
        assert!(slot.is_none());

        let raycast = Raycast::new(Ray::new(Vec3::ZERO, Vec3::Y));
        assert!(owner.resolve_child_raycast(&mut slot, Some(&raycast)).is_some());
        assert!(slot.is_some());
    }
}
