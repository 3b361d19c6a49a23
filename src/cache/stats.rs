//! Cache Statistics Module
//!
//! Counters describing how a named TTL cache is being used.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of a cache's counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Name of the cache the counters belong to
    pub name: String,
    /// Lookups answered without invoking the producer
    pub hits: u64,
    /// Lookups that had to invoke the producer
    pub misses: u64,
    /// Entries removed because they outlived the bound (sweep or lazy)
    pub evictions: u64,
    /// Completed sweeps, forced or not
    pub sweeps: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_sweep(&mut self) {
        self.sweeps += 1;
    }
}
