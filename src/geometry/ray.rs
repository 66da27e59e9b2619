//! Rays

use glam::{Mat4, Vec3};

/// A ray defined by an origin point and a direction vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray with a normalized direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point along the ray at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray by `matrix`.
    ///
    /// The direction is not renormalized, so a parameter `t` names the same
    /// point before and after the transform.
    #[must_use]
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_at() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::X);
        assert_eq!(ray.point_at(5.0), Vec3::new(6.0, 2.0, 3.0));
        assert_eq!(ray.point_at(0.0), ray.origin);
    }

    #[test]
    fn test_transform_preserves_parameter() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::from_rotation_z(0.5),
            Vec3::new(1.0, 1.0, 1.0),
        );
        let moved = ray.transform(&matrix);

        let expected = matrix.transform_point3(ray.point_at(3.0));
        assert!(moved.point_at(3.0).abs_diff_eq(expected, 1e-5));
    }
}
