//! Core module
//!
//! Identity/versioning, configuration, scene files and statistics

mod config;
mod debug;
mod id;
mod scene;

pub use config::{ConfigError, DEFAULT_UPLOADS_PER_FRAME, SceneConfig};
pub use debug::{DebugInfo, PropagationStats};
pub use id::{Stamp, TransformId, Versioned};
pub use scene::{GeometryDesc, Scene, SceneError, SceneNode};
