//! Error types for the companion service
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Bridge Error ==
/// Failures of the external archive tool.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The tool could not be started at all
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully
    #[error("{program} exited with {code:?}\n{output}\nCalled from:\n{origin}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        /// Combined stdout/stderr of the run
        output: String,
        /// Rendered backtrace captured before the process was spawned
        origin: String,
    },

    /// The run ended without ever settling
    #[error("{0} finished without reporting a result")]
    Abandoned(String),
}

// == Archive Error ==
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Entry {entry} missing from extraction directory {dir}")]
    MissingExtractionResult { entry: String, dir: PathBuf },

    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error("Entry path escapes the output directory: {0}")]
    UnsafePath(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Rar error: {0}")]
    Rar(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<unrar::error::UnrarError> for ArchiveError {
    fn from(err: unrar::error::UnrarError) -> Self {
        ArchiveError::Rar(err.to_string())
    }
}

// == Store Error ==
/// Durable store read/write failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

// == Catalogue Error ==
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// Anything the remote client failed with, normalized to a message
    #[error("Remote call failed: {0}")]
    Remote(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogueError {
    /// Normalizes an arbitrary failure message into a loggable remote error.
    ///
    /// Blank messages become `"unknown error"` so log lines never end empty.
    pub fn remote(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            CatalogueError::Remote("unknown error".to_string())
        } else {
            CatalogueError::Remote(message)
        }
    }
}

impl From<reqwest::Error> for CatalogueError {
    fn from(err: reqwest::Error) -> Self {
        CatalogueError::remote(err.to_string())
    }
}

// == Service Error ==
/// Errors returned by the HTTP surface.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Archive(ArchiveError::UnsupportedFormat(_))
            | ServiceError::Archive(ArchiveError::UnsafePath(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Archive(ArchiveError::EntryNotFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::Archive(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
