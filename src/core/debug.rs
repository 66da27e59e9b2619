//! Propagation statistics

use std::collections::VecDeque;

/// Counters for one propagation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Nodes reached by the traversal
    pub visited: usize,
    /// Nodes whose world transform was recomputed
    pub recomputed: usize,
    /// Nodes that took the unchanged fast path
    pub skipped: usize,
    /// Nodes whose world-space bounds were refreshed
    pub bounds_updated: usize,
}

impl PropagationStats {
    /// Fraction of visited nodes that recomputed, 0 for an empty pass
    #[must_use]
    pub fn recompute_ratio(&self) -> f32 {
        if self.visited == 0 {
            0.0
        } else {
            self.recomputed as f32 / self.visited as f32
        }
    }

    /// Get a formatted stats string
    #[must_use]
    pub fn format_stats(&self) -> String {
        format!(
            "visited: {} | recomputed: {} | skipped: {} | bounds: {}",
            self.visited, self.recomputed, self.skipped, self.bounds_updated
        )
    }
}

/// Rolling history of propagation passes
#[derive(Debug)]
pub struct DebugInfo {
    /// Recent passes, oldest first
    history: VecDeque<PropagationStats>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Total passes recorded
    total_frames: u64,
}

impl DebugInfo {
    /// Create a tracker keeping the last 120 passes
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(120)
    }

    /// Create a tracker keeping the last `max_samples` passes
    #[must_use]
    pub fn with_capacity(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            history: VecDeque::with_capacity(max_samples),
            max_samples,
            total_frames: 0,
        }
    }

    /// Record one pass
    pub fn record_frame(&mut self, stats: PropagationStats) {
        self.total_frames += 1;
        if self.history.len() >= self.max_samples {
            self.history.pop_front();
        }
        self.history.push_back(stats);
    }

    /// The most recent pass
    #[must_use]
    pub fn last(&self) -> Option<&PropagationStats> {
        self.history.back()
    }

    /// Mean recompute ratio over the retained history
    #[must_use]
    pub fn avg_recompute_ratio(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        let total: f32 = self.history.iter().map(PropagationStats::recompute_ratio).sum();
        total / self.history.len() as f32
    }

    /// Get total passes recorded
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(visited: usize, recomputed: usize) -> PropagationStats {
        PropagationStats {
            visited,
            recomputed,
            skipped: visited - recomputed,
            bounds_updated: 0,
        }
    }

    #[test]
    fn test_recompute_ratio() {
        assert_eq!(PropagationStats::default().recompute_ratio(), 0.0);
        assert!((pass(4, 1).recompute_ratio() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut debug = DebugInfo::with_capacity(2);
        debug.record_frame(pass(10, 10));
        debug.record_frame(pass(10, 0));
        debug.record_frame(pass(10, 5));

        assert_eq!(debug.total_frames(), 3);
        assert_eq!(debug.last(), Some(&pass(10, 5)));
        assert!((debug.avg_recompute_ratio() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_format() {
        assert_eq!(
            pass(3, 1).format_stats(),
            "visited: 3 | recomputed: 1 | skipped: 2 | bounds: 0"
        );
    }
}
