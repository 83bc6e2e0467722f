//! Pubscope Server Binary
//!
//! Standalone placeholder summary backend.

use std::path::PathBuf;
use std::sync::Arc;

use pubscope_core::{ConfigError, PubscopeConfig};
use pubscope_server::{serve, AppState};
use tracing_subscriber::EnvFilter;

fn load_config() -> Result<PubscopeConfig, ConfigError> {
    let mut config = match std::env::var_os("PUBSCOPE_CONFIG") {
        Some(path) => PubscopeConfig::load(&PathBuf::from(path))?,
        None => PubscopeConfig::load_default()?,
    };

    if let Some(dir) = std::env::var_os("PUBSCOPE_DATA_DIR").map(PathBuf::from) {
        config.data.publications = dir.join("publications.json");
        config.data.summaries = Some(dir.join("summaries.json"));
    }

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let state = Arc::new(AppState::from_config(&config.data)?);
    tracing::info!("Loaded {} summaries", state.summaries.len());

    let addr = std::env::var("PUBSCOPE_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    serve(&addr, state).await
}
