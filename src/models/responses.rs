//! Response DTOs for the companion API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::archive::ArchiveEntry;
use crate::cache::CacheStats;

/// Response body for POST /catalogue/:operation
///
/// `result` is null when the catalogue is temporarily unavailable.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogueResponse {
    pub result: Option<Value>,
}

/// One entry of an archive listing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
}

impl From<&ArchiveEntry> for EntryInfo {
    fn from(entry: &ArchiveEntry) -> Self {
        Self {
            name: entry.entry_name.clone(),
            is_directory: entry.is_directory,
            size: entry.size,
        }
    }
}

/// Response body for POST /archives/entries
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<EntryInfo>,
}

/// Response body for POST /archives/extract
#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    /// Number of entries written
    pub extracted: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Name of the in-memory cache
    pub cache: String,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Completed sweeps
    pub sweeps: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            cache: stats.name,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            sweeps: stats.sweeps,
            total_entries: stats.total_entries,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
