//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and how their age is measured.

use std::time::Duration;

use crate::cache::EvictionPolicy;

// == Cache Entry ==
/// Represents a single cache entry with value and timestamps.
///
/// Values are replaced wholesale; only `renewed_at` ever changes in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last access or renewal timestamp (Unix milliseconds)
    pub renewed_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now_ms`.
    pub fn new(value: V, now_ms: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            renewed_at: now_ms,
        }
    }

    // == Renew ==
    /// Resets the entry's idle age.
    pub fn renew(&mut self, now_ms: u64) {
        self.renewed_at = now_ms;
    }

    // == Age ==
    /// Returns the entry's age in milliseconds under `policy`.
    pub fn age_ms(&self, now_ms: u64, policy: EvictionPolicy) -> u64 {
        let since = match policy {
            EvictionPolicy::Strict => self.created_at,
            EvictionPolicy::Renew => self.renewed_at,
        };
        now_ms.saturating_sub(since)
    }

    // == Check Time Diff ==
    /// Checks if the entry has outlived `max_age`.
    ///
    /// Boundary condition: an entry exactly `max_age` old is still valid; it
    /// expires once its age is strictly greater.
    pub fn check_time_diff(&self, max_age: Duration, now_ms: u64, policy: EvictionPolicy) -> bool {
        self.age_ms(now_ms, policy) > max_age.as_millis() as u64
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, max_age: Duration, now_ms: u64, policy: EvictionPolicy) -> u64 {
        (max_age.as_millis() as u64).saturating_sub(self.age_ms(now_ms, policy))
    }
}
