//! Frame-budgeted upload scheduler
//!
//! Discovery hooks walk a tree of scene items and queue whatever needs
//! uploading. Once armed with [`UploadScheduler::upload`], each
//! [`UploadScheduler::tick`] drains at most `uploads_per_frame` queued items
//! through the upload hooks. An item no hook claims is dropped, not retried.
//! The completion callback runs exactly once, when the queue runs dry.

use std::hash::Hash;

use super::queue::UploadQueue;
use crate::core::{DEFAULT_UPLOADS_PER_FRAME, SceneConfig};

/// A tree of items that discovery can walk.
pub trait UploadTarget: Sized {
    /// Child items, in draw order.
    fn children(&self) -> Vec<Self> {
        Vec::new()
    }
}

/// Finds uploadable data on an item; returns `true` if it handled the item.
pub type DiscoverHook<S, T> = Box<dyn FnMut(&S, &mut UploadQueue<T>) -> bool>;

/// Uploads a queued item; returns `true` if it claimed the item.
pub type UploadHook<T, R> = Box<dyn FnMut(&mut R, &T) -> bool>;

/// Completion callback.
pub type DoneCallback = Box<dyn FnOnce()>;

/// Cooperative, frame-sliced upload driver.
///
/// `S` is the scene item type walked by discovery, `T` the queued item and
/// `R` the upload context handed to upload hooks each tick.
pub struct UploadScheduler<S, T: Eq + Hash + Clone, R> {
    queue: UploadQueue<T>,
    discover_hooks: Vec<DiscoverHook<S, T>>,
    upload_hooks: Vec<UploadHook<T, R>>,
    done: Option<DoneCallback>,
    active: bool,
    uploads_per_frame: usize,
}

impl<S: UploadTarget, T: Eq + Hash + Clone, R> UploadScheduler<S, T, R> {
    /// Create a scheduler with the default per-frame budget.
    #[must_use]
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_UPLOADS_PER_FRAME)
    }

    /// Create a scheduler using the configured per-frame budget.
    #[must_use]
    pub fn with_config(config: &SceneConfig) -> Self {
        Self::with_budget(config.uploads_per_frame)
    }

    /// Create a scheduler that processes `uploads_per_frame` items per tick.
    ///
    /// A budget of zero is raised to one so the queue always drains.
    #[must_use]
    pub fn with_budget(uploads_per_frame: usize) -> Self {
        Self {
            queue: UploadQueue::new(),
            discover_hooks: Vec::new(),
            upload_hooks: Vec::new(),
            done: None,
            active: false,
            uploads_per_frame: uploads_per_frame.max(1),
        }
    }

    /// Register a discovery hook, an upload hook, or both.
    pub fn register(
        &mut self,
        discover: Option<DiscoverHook<S, T>>,
        upload: Option<UploadHook<T, R>>,
    ) -> &mut Self {
        if let Some(hook) = discover {
            self.discover_hooks.push(hook);
        }
        if let Some(hook) = upload {
            self.upload_hooks.push(hook);
        }
        self
    }

    /// Run discovery on `item` and, recursively, its children.
    ///
    /// The first discovery hook returning `true` ends the search for that
    /// item. Children are visited last to first.
    pub fn add(&mut self, item: &S) -> &mut Self {
        for hook in &mut self.discover_hooks {
            if hook(item, &mut self.queue) {
                break;
            }
        }
        for child in item.children().iter().rev() {
            self.add(child);
        }
        self
    }

    /// Queue an item directly, bypassing discovery.
    pub fn enqueue(&mut self, item: T) -> &mut Self {
        self.queue.push(item);
        self
    }

    /// Start draining the queue; `done` runs once it is empty.
    ///
    /// With nothing queued, `done` runs immediately. Calling this while
    /// already active replaces the pending callback.
    pub fn upload(&mut self, done: impl FnOnce() + 'static) {
        if self.queue.is_empty() {
            done();
            return;
        }
        log::debug!("Upload armed with {} queued items", self.queue.len());
        self.done = Some(Box::new(done));
        self.active = true;
    }

    /// Process one frame's worth of uploads.
    ///
    /// Returns `true` while more ticks are needed. Does nothing unless
    /// [`upload`](Self::upload) has been called.
    pub fn tick(&mut self, ctx: &mut R) -> bool {
        if !self.active {
            return false;
        }

        let mut processed = 0;
        while processed < self.uploads_per_frame {
            let Some(item) = self.queue.pop() else {
                break;
            };
            processed += 1;

            let claimed = self.upload_hooks.iter_mut().any(|hook| hook(ctx, &item));
            if !claimed {
                log::debug!("No upload hook claimed a queued item; dropping it");
            }
        }
        log::trace!(
            "Upload tick processed {processed} items, {} left",
            self.queue.len()
        );

        if !self.queue.is_empty() {
            return true;
        }

        self.active = false;
        log::info!("Upload queue drained");
        if let Some(done) = self.done.take() {
            done();
        }
        false
    }

    /// Check if the scheduler is waiting on ticks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Get the number of queued items
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn uploads_per_frame(&self) -> usize {
        self.uploads_per_frame
    }

    /// Read-only view of the queue
    #[must_use]
    pub fn queue(&self) -> &UploadQueue<T> {
        &self.queue
    }
}

impl<S: UploadTarget, T: Eq + Hash + Clone, R> Default for UploadScheduler<S, T, R> {
    fn default() -> Self {
        Self::new()
    }
}
