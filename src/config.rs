//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::EvictionPolicy;

const DEFAULT_CATALOGUE_URL: &str = "http://127.0.0.1:3001";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between in-memory cache sweeps
    pub cleanup_interval: u64,
    /// Seconds an in-memory catalogue entry stays valid
    pub memory_ttl: u64,
    /// Eviction policy of the in-memory tier
    pub memory_policy: EvictionPolicy,
    /// Durable catalogue store file
    pub cache_file: PathBuf,
    /// Root for per-request archive extraction directories
    pub temp_root: PathBuf,
    /// Explicit archive tool path, bypassing the bundled one
    pub seven_zip_path: Option<PathBuf>,
    /// Packaged resources root; unset means a source checkout
    pub resources_dir: Option<PathBuf>,
    /// Base URL of the catalogue relay
    pub catalogue_url: String,
    /// Only browser origin allowed cross-origin access; unset means none
    pub cors_origin: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `MEMORY_TTL` - In-memory entry lifetime in seconds (default: 300)
    /// - `MEMORY_POLICY` - `strict` or `renew` (default: strict)
    /// - `CACHE_FILE` - Durable store path (default: `<data dir>/mod-companion/catalogue-cache.json`)
    /// - `TEMP_ROOT` - Extraction temp root (default: `<temp dir>/mod-companion`)
    /// - `SEVEN_ZIP_PATH` - Archive tool override (default: bundled tool)
    /// - `RESOURCES_DIR` - Packaged resources root (default: unset)
    /// - `CATALOGUE_URL` - Catalogue relay (default: `http://127.0.0.1:3001`)
    /// - `CORS_ORIGIN` - Browser origin allowed to call the API (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            memory_ttl: env::var("MEMORY_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.memory_ttl),
            memory_policy: env::var("MEMORY_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.memory_policy),
            cache_file: env::var_os("CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_file),
            temp_root: env::var_os("TEMP_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_root),
            seven_zip_path: env::var_os("SEVEN_ZIP_PATH").map(PathBuf::from),
            resources_dir: env::var_os("RESOURCES_DIR").map(PathBuf::from),
            catalogue_url: env::var("CATALOGUE_URL").unwrap_or(defaults.catalogue_url),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn cleanup_every(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }

    pub fn memory_max_age(&self) -> Duration {
        Duration::from_secs(self.memory_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(env::temp_dir);
        Self {
            server_port: 3000,
            cleanup_interval: 60,
            memory_ttl: 300,
            memory_policy: EvictionPolicy::Strict,
            cache_file: data_dir.join("mod-companion").join("catalogue-cache.json"),
            temp_root: env::temp_dir().join("mod-companion"),
            seven_zip_path: None,
            resources_dir: None,
            catalogue_url: DEFAULT_CATALOGUE_URL.to_string(),
            cors_origin: None,
        }
    }
}
