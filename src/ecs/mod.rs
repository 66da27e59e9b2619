//! Entity Component System module
//!
//! Scene nodes stored in a hecs world, with parent/child links and the
//! per-frame transform propagation pass

mod components;
mod hierarchy;
mod world;

pub use components::{Name, Node};
pub use hierarchy::{Children, Parent};
pub use world::{NodeRef, RayHit, SceneWorld};
