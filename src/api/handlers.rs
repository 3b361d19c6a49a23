//! API Handlers
//!
//! HTTP request handlers for each companion endpoint.

use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::archive::{ArchiveContext, ArchiveReader, SevenZipBridge, ToolLayout};
use crate::cache::TtlCache;
use crate::catalogue::{CacheOrchestrator, HttpCatalogueClient, JsonFileStore};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::ServiceError;
use crate::models::{
    CatalogueRequest, CatalogueResponse, EntriesRequest, EntriesResponse, EntryInfo,
    ExtractRequest, ExtractResponse, HealthResponse, StatsResponse,
};

type ApiResult<T> = std::result::Result<Json<T>, ServiceError>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalogue: Arc<CacheOrchestrator>,
    pub archives: ArchiveContext,
}

impl AppState {
    pub fn new(catalogue: CacheOrchestrator, archives: ArchiveContext) -> Self {
        Self {
            catalogue: Arc::new(catalogue),
            archives,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Wires the relay client, the durable store file, the in-memory tier and
    /// the archive tool.
    pub fn from_config(config: &Config) -> Self {
        let clock = Arc::new(SystemClock);
        let memory = TtlCache::with_clock(
            "catalogue",
            config.memory_max_age(),
            config.memory_policy,
            clock.clone(),
        );
        let catalogue = CacheOrchestrator::new(
            Arc::new(HttpCatalogueClient::new(config.catalogue_url.clone())),
            Arc::new(JsonFileStore::new(config.cache_file.clone())),
            memory,
            clock,
        );

        let layout = ToolLayout::detect(config.resources_dir.as_deref());
        let bridge = SevenZipBridge::resolve(config.seven_zip_path.as_deref(), &layout);
        let archives = ArchiveContext::new(Arc::new(bridge), config.temp_root.clone());

        Self::new(catalogue, archives)
    }

    /// Starts the periodic sweep of the in-memory tier.
    pub fn start_sweeping(&self, every: Duration) -> bool {
        self.catalogue.memory().start(every)
    }
}

/// Handler for POST /catalogue/:operation
///
/// Answers from cache where allowed. A null result means the catalogue could
/// not be reached just now.
pub async fn catalogue_handler(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    Json(req): Json<CatalogueRequest>,
) -> ApiResult<CatalogueResponse> {
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let result = state
        .catalogue
        .call(&req.api_key, &operation, &req.args)
        .await;

    Ok(Json(CatalogueResponse { result }))
}

/// Handler for POST /archives/entries
///
/// Lists an archive. Unreadable archives list as empty.
pub async fn entries_handler(
    State(state): State<AppState>,
    Json(req): Json<EntriesRequest>,
) -> ApiResult<EntriesResponse> {
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let reader = ArchiveReader::open(&req.path, &state.archives);
    let entries = reader
        .get_entries()
        .await
        .iter()
        .map(EntryInfo::from)
        .collect();

    Ok(Json(EntriesResponse { entries }))
}

/// Handler for POST /archives/extract
pub async fn extract_handler(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> ApiResult<ExtractResponse> {
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let reader = ArchiveReader::open(&req.path, &state.archives);
    let extracted = reader
        .extract_all_to(FsPath::new(&req.output), req.overwrite, &req.ignores)
        .await?;
    info!(archive = %req.path, extracted, "Extraction finished");

    Ok(Json(ExtractResponse { extracted }))
}

/// Handler for GET /stats
///
/// Returns the in-memory catalogue cache counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.catalogue.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
