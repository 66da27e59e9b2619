//! Local transforms
//!
//! Position/rotation/scale inputs that feed world-transform composition.
//! Every mutation that changes the resulting matrix rebuilds it immediately,
//! reclassifies its [`OperationKind`] and bumps the version, so downstream
//! caches only ever need to compare stamps.
//!
//! # Example
//!
//! ```ignore
//! let mut local = LocalTransform::from_position(Vec3::new(1.0, 0.0, 0.0));
//! assert_eq!(local.kind(), OperationKind::TranslationOnly);
//!
//! local.set_position(Vec3::new(1.0, 0.0, 0.0)); // same value, version unchanged
//! local.rotate(Quat::from_rotation_y(0.5));     // version + 1, now Generic
//! ```

use glam::{Affine2, Mat4, Quat, Vec2, Vec3};

use super::source::{OperationKind, TransformMatrix, TransformSource};
use crate::core::{TransformId, Versioned};

/// Pick the cheapest composition path that reproduces `matrix` exactly.
#[must_use]
pub fn classify(matrix: &Mat4) -> OperationKind {
    if *matrix == Mat4::IDENTITY {
        OperationKind::Identity
    } else if matrix.x_axis == Mat4::IDENTITY.x_axis
        && matrix.y_axis == Mat4::IDENTITY.y_axis
        && matrix.z_axis == Mat4::IDENTITY.z_axis
        && matrix.w_axis.w == 1.0
    {
        OperationKind::TranslationOnly
    } else {
        OperationKind::Generic
    }
}

// ============================================================================
// 3D Local Transform
// ============================================================================

/// A 3D local transform built from position, rotation and scale.
///
/// The matrix is kept in sync with the components; setters that pass the
/// current value are no-ops and leave the version alone.
#[derive(Debug, Clone)]
pub struct LocalTransform {
    id: TransformId,
    version: u64,

    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    eye_vector: Option<Vec3>,

    matrix: Mat4,
    kind: OperationKind,
}

impl LocalTransform {
    /// Create an identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from position.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self::from_parts(position, Quat::IDENTITY, Vec3::ONE)
    }

    /// Create from position, rotation, and scale.
    #[must_use]
    pub fn from_parts(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let matrix = Mat4::from_scale_rotation_translation(scale, rotation, position);
        Self {
            id: TransformId::next(),
            version: 0,
            position,
            rotation,
            scale,
            eye_vector: None,
            matrix,
            kind: classify(&matrix),
        }
    }

    /// Create from an arbitrary matrix.
    ///
    /// Components are decomposed from the matrix; the matrix itself is kept
    /// verbatim so projective or sheared inputs survive.
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            id: TransformId::next(),
            version: 0,
            position,
            rotation,
            scale,
            eye_vector: None,
            matrix,
            kind: classify(&matrix),
        }
    }

    // -------------------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------------------

    #[must_use]
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[must_use]
    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// The local matrix.
    #[must_use]
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Forward direction (negative Z in local space).
    #[must_use]
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    // -------------------------------------------------------------------------
    // Setters (bump version on change)
    // -------------------------------------------------------------------------

    /// Set the position.
    pub fn set_position(&mut self, position: Vec3) {
        if self.position != position {
            self.position = position;
            self.rebuild();
        }
    }

    /// Set the rotation.
    pub fn set_rotation(&mut self, rotation: Quat) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.rebuild();
        }
    }

    /// Set the scale.
    pub fn set_scale(&mut self, scale: Vec3) {
        if self.scale != scale {
            self.scale = scale;
            self.rebuild();
        }
    }

    /// Set all components at once.
    pub fn set(&mut self, position: Vec3, rotation: Quat, scale: Vec3) {
        if self.position != position || self.rotation != rotation || self.scale != scale {
            self.position = position;
            self.rotation = rotation;
            self.scale = scale;
            self.rebuild();
        }
    }

    /// Replace the matrix directly.
    pub fn set_matrix(&mut self, matrix: Mat4) {
        if self.matrix != matrix {
            let (scale, rotation, position) = matrix.to_scale_rotation_translation();
            self.position = position;
            self.rotation = rotation;
            self.scale = scale;
            self.matrix = matrix;
            self.kind = classify(&matrix);
            self.version += 1;
        }
    }

    /// Attach a camera eye direction that children inherit.
    pub fn set_eye_vector(&mut self, eye_vector: Option<Vec3>) {
        if self.eye_vector != eye_vector {
            self.eye_vector = eye_vector;
            self.version += 1;
        }
    }

    /// Translate by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        if delta != Vec3::ZERO {
            self.position += delta;
            self.rebuild();
        }
    }

    /// Rotate by a quaternion.
    pub fn rotate(&mut self, rotation: Quat) {
        if rotation != Quat::IDENTITY {
            self.rotation = rotation * self.rotation;
            self.rebuild();
        }
    }

    /// Scale uniformly.
    pub fn scale_uniform(&mut self, factor: f32) {
        if factor != 1.0 {
            self.scale *= factor;
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        self.matrix =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.kind = classify(&self.matrix);
        self.version += 1;
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::from_parts(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

impl Versioned for LocalTransform {
    fn id(&self) -> TransformId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl TransformSource for LocalTransform {
    fn kind(&self) -> OperationKind {
        self.kind
    }

    fn matrix(&self) -> TransformMatrix {
        TransformMatrix::Affine3d(self.matrix)
    }

    fn eye_vector(&self) -> Option<Vec3> {
        self.eye_vector
    }
}

// ============================================================================
// 2D Local Transform
// ============================================================================

/// A 2D local transform in the XY plane.
///
/// Feeds 3D composition through its affine matrix, which is lifted to 4x4 on
/// demand by the world cache.
#[derive(Debug, Clone)]
pub struct LocalTransform2d {
    id: TransformId,
    version: u64,

    position: Vec2,
    angle: f32,
    scale: Vec2,

    affine: Affine2,
    kind: OperationKind,
}

impl LocalTransform2d {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from position, rotation angle (radians) and scale.
    #[must_use]
    pub fn from_parts(position: Vec2, angle: f32, scale: Vec2) -> Self {
        let mut transform = Self {
            id: TransformId::next(),
            version: 0,
            position,
            angle,
            scale,
            affine: Affine2::IDENTITY,
            kind: OperationKind::Identity,
        };
        transform.affine = transform.compose();
        transform.kind = transform.classify();
        transform
    }

    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self::from_parts(position, 0.0, Vec2::ONE)
    }

    #[must_use]
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[must_use]
    #[inline]
    pub fn affine(&self) -> Affine2 {
        self.affine
    }

    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.rebuild();
        }
    }

    pub fn set_angle(&mut self, angle: f32) {
        if self.angle != angle {
            self.angle = angle;
            self.rebuild();
        }
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        if self.scale != scale {
            self.scale = scale;
            self.rebuild();
        }
    }

    fn compose(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.angle, self.position)
    }

    fn classify(&self) -> OperationKind {
        if self.angle != 0.0 || self.scale != Vec2::ONE {
            OperationKind::Generic
        } else if self.position == Vec2::ZERO {
            OperationKind::Identity
        } else {
            OperationKind::TranslationOnly
        }
    }

    fn rebuild(&mut self) {
        self.affine = self.compose();
        self.kind = self.classify();
        self.version += 1;
    }
}

impl Default for LocalTransform2d {
    fn default() -> Self {
        Self::from_parts(Vec2::ZERO, 0.0, Vec2::ONE)
    }
}

impl Versioned for LocalTransform2d {
    fn id(&self) -> TransformId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl TransformSource for LocalTransform2d {
    fn kind(&self) -> OperationKind {
        self.kind
    }

    fn matrix(&self) -> TransformMatrix {
        TransformMatrix::Affine2d(self.affine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let local = LocalTransform::new();
        assert_eq!(local.kind(), OperationKind::Identity);
        assert_eq!(local.local_matrix(), Mat4::IDENTITY);
        assert_eq!(local.version(), 0);
    }

    #[test]
    fn test_position_only_is_translation() {
        let local = LocalTransform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(local.kind(), OperationKind::TranslationOnly);
        assert_eq!(local.matrix().translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rotation_is_generic() {
        let mut local = LocalTransform::new();
        local.rotate(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert_eq!(local.kind(), OperationKind::Generic);
        assert_eq!(local.version(), 1);
    }

    #[test]
    fn test_same_value_keeps_version() {
        let mut local = LocalTransform::from_position(Vec3::X);
        local.set_position(Vec3::X);
        local.set_scale(Vec3::ONE);
        local.translate(Vec3::ZERO);
        assert_eq!(local.version(), 0);

        local.set_position(Vec3::Y);
        assert_eq!(local.version(), 1);
    }

    #[test]
    fn test_noop_rotate_and_scale_keep_version() {
        let mut local = LocalTransform::from_position(Vec3::X);
        local.rotate(Quat::IDENTITY);
        local.scale_uniform(1.0);
        assert_eq!(local.version(), 0);

        local.rotate(Quat::from_rotation_z(0.5));
        local.scale_uniform(2.0);
        assert_eq!(local.version(), 2);
        assert_eq!(local.scale(), Vec3::splat(2.0));
    }

    #[test]
    fn test_reset_to_origin_becomes_identity() {
        let mut local = LocalTransform::from_position(Vec3::X);
        local.set_position(Vec3::ZERO);
        assert_eq!(local.kind(), OperationKind::Identity);
    }

    #[test]
    fn test_set_matrix_classifies() {
        let mut local = LocalTransform::new();
        local.set_matrix(Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0)));
        assert_eq!(local.kind(), OperationKind::TranslationOnly);
        assert!((local.position() - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-6);

        local.set_matrix(Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(local.kind(), OperationKind::Generic);
        assert_eq!(local.version(), 2);
    }

    #[test]
    fn test_eye_vector_bumps_version() {
        let mut local = LocalTransform::new();
        local.set_eye_vector(Some(Vec3::Z));
        assert_eq!(local.eye_vector(), Some(Vec3::Z));
        assert_eq!(local.version(), 1);

        local.set_eye_vector(Some(Vec3::Z));
        assert_eq!(local.version(), 1);
    }

    #[test]
    fn test_forward_direction() {
        let local = LocalTransform::new();
        assert!((local.forward() - Vec3::NEG_Z).length() < 0.001);
    }

    #[test]
    fn test_2d_classification() {
        let mut local = LocalTransform2d::new();
        assert_eq!(local.kind(), OperationKind::Identity);

        local.set_position(Vec2::new(3.0, 4.0));
        assert_eq!(local.kind(), OperationKind::TranslationOnly);

        local.set_angle(0.25);
        assert_eq!(local.kind(), OperationKind::Generic);
        assert_eq!(local.version(), 2);
        assert!(!local.matrix().is_3d());
    }
}
