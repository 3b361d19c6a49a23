//! Cache Module
//!
//! Generic named in-memory cache with time-boxed entries and a sweep timer.

mod entry;
mod policy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use policy::EvictionPolicy;
pub use stats::CacheStats;
pub use store::TtlCache;
