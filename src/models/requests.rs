//! Request DTOs for the companion API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for POST /catalogue/:operation
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueRequest {
    /// Catalogue API key of the user
    pub api_key: String,
    /// Positional operation arguments
    #[serde(default)]
    pub args: Vec<Value>,
}

impl CatalogueRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.api_key.trim().is_empty() {
            return Some("API key cannot be empty".to_string());
        }
        None
    }
}

/// Request body for POST /archives/entries
#[derive(Debug, Clone, Deserialize)]
pub struct EntriesRequest {
    /// Archive file to list
    pub path: String,
}

impl EntriesRequest {
    pub fn validate(&self) -> Option<String> {
        if self.path.is_empty() {
            return Some("Archive path cannot be empty".to_string());
        }
        None
    }
}

/// Request body for POST /archives/extract
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    /// Archive file to extract
    pub path: String,
    /// Directory the entries are written under
    pub output: String,
    /// Replace files that already exist
    #[serde(default)]
    pub overwrite: bool,
    /// Entry names to leave out, matched verbatim
    #[serde(default)]
    pub ignores: Vec<String>,
}

impl ExtractRequest {
    pub fn validate(&self) -> Option<String> {
        if self.path.is_empty() {
            return Some("Archive path cannot be empty".to_string());
        }
        if self.output.is_empty() {
            return Some("Output directory cannot be empty".to_string());
        }
        None
    }
}
