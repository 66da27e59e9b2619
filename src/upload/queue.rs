//! FIFO queue of pending uploads

use std::collections::VecDeque;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// FIFO of items waiting to be uploaded.
///
/// Tracks how many copies of each item are queued so discovery hooks can
/// skip items that are already pending.
#[derive(Debug)]
pub struct UploadQueue<T: Eq + Hash + Clone> {
    items: VecDeque<T>,
    queued: FxHashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> UploadQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            queued: FxHashMap::default(),
        }
    }

    /// Append an item, even if it is already queued.
    pub fn push(&mut self, item: T) {
        *self.queued.entry(item.clone()).or_insert(0) += 1;
        self.items.push_back(item);
    }

    /// Append an item unless it is already queued.
    ///
    /// Returns `true` if the item was added.
    pub fn push_unique(&mut self, item: T) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.push(item);
        true
    }

    /// Remove the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        let item = self.items.pop_front()?;
        if let Some(count) = self.queued.get_mut(&item) {
            *count -= 1;
            if *count == 0 {
                self.queued.remove(&item);
            }
        }
        Some(item)
    }

    #[must_use]
    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        self.queued.contains_key(item)
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over queued items, oldest first.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.queued.clear();
    }
}

impl<T: Eq + Hash + Clone> Default for UploadQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = UploadQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_push_unique_dedupes() {
        let mut queue = UploadQueue::new();
        assert!(queue.push_unique("a"));
        assert!(!queue.push_unique("a"));
        assert!(queue.push_unique("b"));
        assert_eq!(queue.len(), 2);

        queue.pop();
        assert!(!queue.contains(&"a"));
        assert!(queue.push_unique("a"));
    }

    #[test]
    fn test_plain_push_keeps_duplicates() {
        let mut queue = UploadQueue::new();
        queue.push(7);
        queue.push(7);
        assert_eq!(queue.len(), 2);

        queue.pop();
        assert!(queue.contains(&7), "second copy still queued");
        queue.pop();
        assert!(!queue.contains(&7));
        assert!(queue.is_empty());
    }
}
