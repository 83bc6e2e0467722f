//! Pubscope Server - placeholder summary backend
//!
//! Serves precomputed article summaries to the dashboard and exposes the
//! prompt-building helpers. No model is called and nothing is persisted.

pub mod error;
pub mod http;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use pubscope_core::config::DataConfig;
use pubscope_core::error::DataError;
use pubscope_core::store::load_summaries;
use pubscope_core::SummaryIndex;

pub use error::ApiError;

/// Shared application state
#[derive(Debug, Default)]
pub struct AppState {
    pub summaries: SummaryIndex,
}

impl AppState {
    pub fn new(summaries: SummaryIndex) -> Self {
        Self { summaries }
    }

    /// Load the summaries named by the data configuration.
    ///
    /// A configured file that does not exist yet gives an empty store; a
    /// file that exists but does not parse is an error.
    pub fn from_config(config: &DataConfig) -> Result<Self, DataError> {
        let summaries = match config.summaries {
            Some(ref path) if path.exists() => load_summaries(path)?,
            Some(ref path) => {
                tracing::warn!("Summaries file {:?} not found, serving none", path);
                SummaryIndex::new()
            }
            None => SummaryIndex::new(),
        };
        Ok(Self::new(summaries))
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/hello", get(http::hello))
        // Summary endpoints
        .route("/api/summary", get(http::get_summary))
        .route("/api/summaries", get(http::list_summaries))
        // Prompt helpers
        .route("/api/build_prompt", post(http::build_prompt))
        .route("/api/normalize_sections", post(http::normalize_sections))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Pubscope server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
