//! Catalogue Module
//!
//! Two-tier caching in front of the remote mod catalogue.

mod client;
mod durable;
mod key;
mod orchestrator;
mod policy;

pub use client::{CatalogueClient, HttpCatalogueClient};
pub use durable::{DurableStore, JsonFileStore, MemoryStore};
pub use key::{cache_key, log_key, REDACTED};
pub use orchestrator::{CacheOrchestrator, CACHE_TIME_FIELD};
pub use policy::{lookup, OperationPolicy, OPERATIONS, RATE_LIMITS};
