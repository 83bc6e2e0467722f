//! Client for the summary endpoint.
//!
//! `GET {base}/api/summary?pmid=…` (or `pmc=`, `title=`). A 2xx body is
//! parsed leniently into an [`ArticleSummary`]; anything else becomes a
//! [`SummaryError`] whose `Display` is shown to the user as-is.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use pubscope_core::config::SummaryEndpointConfig;
use pubscope_core::{ArticleSummary, Publication, SummaryKey};

use crate::http::{HttpClient, HttpError, HttpResponse};

const SUMMARY_PATH: &str = "api/summary";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Summary request failed ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("Summary service is busy, try again shortly")]
    RateLimited,
    #[error("Summary request timed out")]
    Timeout,
    #[error("No identifier to request a summary for")]
    NoKey,
    #[error("Invalid summary endpoint: {0}")]
    InvalidEndpoint(String),
    #[error(transparent)]
    Http(HttpError),
}

impl From<HttpError> for SummaryError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::RateLimited => SummaryError::RateLimited,
            HttpError::Timeout => SummaryError::Timeout,
            other => SummaryError::Http(other),
        }
    }
}

#[derive(Debug)]
pub struct SummaryClient {
    http: HttpClient,
    endpoint: Url,
}

impl SummaryClient {
    /// Client for `base_url` with the default timeout and user agent.
    pub fn new(base_url: &str) -> Result<Self, SummaryError> {
        Self::from_config(&SummaryEndpointConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &SummaryEndpointConfig) -> Result<Self, SummaryError> {
        let endpoint = summary_endpoint(&config.base_url)?;
        let http = HttpClient::new(&config.user_agent, Duration::from_secs(config.timeout_secs))?;
        Ok(Self { http, endpoint })
    }

    /// Full URL of the summary resource, without query.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn fetch(&self, key: &SummaryKey) -> Result<ArticleSummary, SummaryError> {
        let (name, value) = key.query_pair();
        let response = self
            .http
            .get_with_params(&self.endpoint, &[(name, value)])
            .await?;

        if !response.is_success() {
            let message = error_message(&response);
            tracing::warn!(status = response.status, name, value, "summary request failed: {}", message);
            return Err(SummaryError::Status {
                status: response.status,
                message,
            });
        }

        tracing::debug!(
            name,
            value,
            bytes = response.body.len(),
            content_type = response.content_type().as_deref().unwrap_or("-"),
            "summary received"
        );
        Ok(ArticleSummary::parse_lenient(&response.body))
    }

    /// Fetch by the record's best identifier (PMID, then PMC id, then title).
    pub async fn fetch_for(&self, record: &Publication) -> Result<ArticleSummary, SummaryError> {
        let key = SummaryKey::for_publication(record).ok_or(SummaryError::NoKey)?;
        self.fetch(&key).await
    }
}

fn summary_endpoint(base_url: &str) -> Result<Url, SummaryError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(SUMMARY_PATH))
        .map_err(|e| SummaryError::InvalidEndpoint(format!("{} ({})", base_url, e)))
}

/// Human-readable reason for a failed response: the `error`/`message` field
/// of a JSON body, else the body text, else the status reason.
fn error_message(response: &HttpResponse) -> String {
    if response.is_json() {
        if let Ok(serde_json::Value::Object(map)) =
            serde_json::from_str::<serde_json::Value>(&response.body)
        {
            for field in ["error", "message", "detail"] {
                if let Some(text) = map.get(field).and_then(|v| v.as_str()) {
                    return text.to_string();
                }
            }
        }
    }

    let status = response.status;
    let text = response.body.trim();
    if !text.is_empty() {
        return text.chars().take(200).collect();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
        .to_string()
}
