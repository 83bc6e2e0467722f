//! Configuration for pubscope
//!
//! Where the static data lives, where the summary endpoint is, and the
//! default table sort. Loaded from TOML or JSON; the summary endpoint's base
//! URL can be overridden with `PUBSCOPE_SUMMARY_URL`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sort::SortKey;

/// Environment variable overriding [`SummaryEndpointConfig::base_url`].
pub const SUMMARY_URL_ENV: &str = "PUBSCOPE_SUMMARY_URL";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PubscopeConfig {
    /// Static data locations
    pub data: DataConfig,
    /// Summary fetch boundary
    pub summary: SummaryEndpointConfig,
    /// Table defaults
    pub view: ViewConfig,
}

/// Static data locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Publications JSON
    pub publications: PathBuf,
    /// Precomputed summaries JSON (optional)
    pub summaries: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            publications: PathBuf::from("data/publications.json"),
            summaries: Some(PathBuf::from("data/summaries.json")),
        }
    }
}

/// Summary endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryEndpointConfig {
    /// Base URL, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for SummaryEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 30,
            user_agent: format!("pubscope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Table defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Sort applied on load and after clearing filters
    pub default_sort: SortKey,
}

impl PubscopeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue(format!("cannot serialize config: {}", e)))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file, TOML unless the extension is `.json`. Relative data
    /// paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `<config dir>/pubscope/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pubscope").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when no
    /// file exists there.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Make relative data paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.data.publications.is_relative() {
            self.data.publications = base.join(&self.data.publications);
        }
        if let Some(ref mut summaries) = self.data.summaries {
            if summaries.is_relative() {
                *summaries = base.join(&*summaries);
            }
        }
    }

    /// Apply `PUBSCOPE_SUMMARY_URL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(SUMMARY_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.summary.base_url = url.trim().to_string();
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.summary.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "summary.base_url must be an http(s) URL, got {:?}",
                self.summary.base_url
            )));
        }

        if self.summary.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "summary.timeout_secs must be positive".to_string(),
            ));
        }

        if self.data.publications.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "data.publications must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
