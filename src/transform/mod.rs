//! Incremental world-transform propagation
//!
//! Local transforms are composed into cached world transforms. Each cache
//! recomputes only when the id or version of one of its inputs changed.

mod local;
mod memo;
mod source;
mod world;

pub use local::{LocalTransform, LocalTransform2d, classify};
pub use memo::Memo;
pub use source::{OperationKind, TransformMatrix, TransformSource, lift_affine2};
pub use world::{Side, WorldTransformCache};
