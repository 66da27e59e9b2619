//! Inputs to world-transform composition
//!
//! Parents and locals are both [`TransformSource`]s. A source exposes its
//! stamp, an [`OperationKind`] hint, and its matrix in either a 2D affine or a
//! full 4x4 representation. Composition always happens in 4x4.

use glam::{Affine2, Mat4, Vec3, Vec4};

use crate::core::Versioned;

/// What a local transform does, used to pick a cheaper composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationKind {
    /// Arbitrary affine or projective matrix
    #[default]
    Generic,
    /// Only the translation column differs from identity
    TranslationOnly,
    /// The matrix is the identity
    Identity,
}

/// A transform matrix in one of the supported representations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformMatrix {
    /// 2D affine transform (2x2 linear part plus translation)
    Affine2d(Affine2),
    /// Full 4x4 matrix
    Affine3d(Mat4),
}

impl TransformMatrix {
    /// Lift to the common 4x4 form.
    #[must_use]
    pub fn to_mat4(self) -> Mat4 {
        match self {
            Self::Affine2d(affine) => lift_affine2(&affine),
            Self::Affine3d(matrix) => matrix,
        }
    }

    /// Translation part, with z = 0 for 2D matrices.
    #[must_use]
    pub fn translation(self) -> Vec3 {
        match self {
            Self::Affine2d(affine) => affine.translation.extend(0.0),
            Self::Affine3d(matrix) => matrix.w_axis.truncate(),
        }
    }

    /// Check if this is the 4x4 representation.
    #[must_use]
    pub const fn is_3d(&self) -> bool {
        matches!(self, Self::Affine3d(_))
    }
}

/// Embed a 2D affine transform into a 4x4 matrix acting on the XY plane.
#[must_use]
pub fn lift_affine2(affine: &Affine2) -> Mat4 {
    Mat4::from_cols(
        affine.matrix2.x_axis.extend(0.0).extend(0.0),
        affine.matrix2.y_axis.extend(0.0).extend(0.0),
        Vec4::Z,
        affine.translation.extend(0.0).extend(1.0),
    )
}

/// A versioned transform that can feed world-transform composition.
pub trait TransformSource: Versioned {
    /// Composition hint for this transform.
    fn kind(&self) -> OperationKind;

    /// The transform matrix in its native representation.
    fn matrix(&self) -> TransformMatrix;

    /// Camera eye direction carried down the hierarchy, if any.
    fn eye_vector(&self) -> Option<Vec3> {
        None
    }
}
