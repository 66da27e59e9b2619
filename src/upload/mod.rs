//! Upload scheduling
//!
//! Spreads uploads of scene data across frames with a fixed per-frame budget

mod queue;
mod scheduler;

pub use queue::UploadQueue;
pub use scheduler::{DiscoverHook, DoneCallback, UploadHook, UploadScheduler, UploadTarget};
