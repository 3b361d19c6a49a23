//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the service is up.
//!
//! # Tasks
//! - TTL Sweep: Removes stale entries from a named in-memory cache

mod sweep;

pub use sweep::{spawn_sweep_task, Sweep};
