//! Geometry and raycast data derived from world transforms
//!
//! Bounds and local-space rays are cached per node with the same stamp
//! discipline as the world transform itself.

mod aabb;
mod bounds;
mod derived;
mod ray;
mod raycast;

pub use aabb::Aabb;
pub use bounds::{ComputedBounds, Geometry};
pub use derived::{ArtifactSource, DerivedCache};
pub use ray::Ray;
pub use raycast::{ComputedRaycast, Raycast};
