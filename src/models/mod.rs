//! Request and Response models for the companion API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CatalogueRequest, EntriesRequest, ExtractRequest};
pub use responses::{
    CatalogueResponse, EntriesResponse, EntryInfo, ErrorResponse, ExtractResponse,
    HealthResponse, StatsResponse,
};
