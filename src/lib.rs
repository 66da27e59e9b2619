//! Incremental world-transform propagation for scene graphs
//!
//! This crate provides:
//! - Versioned local and world transforms that only recompute when an input changed
//! - World-space bounds and local-space raycasts derived from cached transforms
//! - A hecs-backed scene world with parent/child propagation
//! - A frame-budgeted upload scheduler

pub mod core;
pub mod ecs;
pub mod geometry;
pub mod transform;
pub mod upload;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{DebugInfo, PropagationStats, Scene, SceneConfig, SceneNode, Versioned};
    pub use crate::ecs::{Name, Node, NodeRef, RayHit, SceneWorld};
    pub use crate::geometry::{Aabb, Geometry, Ray, Raycast};
    pub use crate::transform::{LocalTransform, LocalTransform2d, OperationKind, Side, WorldTransformCache};
    pub use crate::upload::{UploadQueue, UploadScheduler, UploadTarget};
    pub use glam::{Affine2, Mat4, Quat, Vec2, Vec3, Vec4};
}
