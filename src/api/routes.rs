//! API Routes
//!
//! Configures the Axum router with all companion endpoints.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use super::handlers::{
    catalogue_handler, entries_handler, extract_handler, health_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// Cross-origin browser access is only granted to `allowed_origin`; without
/// one, no CORS headers are sent and browsers keep other sites out.
///
/// # Endpoints
/// - `POST /catalogue/:operation` - Cached catalogue call
/// - `POST /archives/entries` - List an archive
/// - `POST /archives/extract` - Extract an archive
/// - `GET /stats` - In-memory cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState, allowed_origin: Option<&str>) -> Router {
    let mut router = Router::new()
        .route("/catalogue/:operation", post(catalogue_handler))
        .route("/archives/entries", post(entries_handler))
        .route("/archives/extract", post(extract_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler));

    if let Some(cors) = allowed_origin.and_then(cors_for) {
        router = router.layer(cors);
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_for(origin: &str) -> Option<CorsLayer> {
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        Err(err) => {
            warn!(origin, "Ignoring invalid CORS origin: {}", err);
            None
        }
    }
}
