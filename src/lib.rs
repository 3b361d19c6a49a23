//! Mod Companion - local companion service for a mod manager
//!
//! Shields the rate-limited mod catalogue behind a two-tier cache and reads
//! zip, rar and 7z mod archives through one entry model.

pub mod api;
pub mod archive;
pub mod cache;
pub mod catalogue;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use archive::ArchiveReader;
pub use cache::TtlCache;
pub use catalogue::CacheOrchestrator;
pub use config::Config;
