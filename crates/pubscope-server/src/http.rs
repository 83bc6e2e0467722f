//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pubscope_core::sections;
use pubscope_core::{ArticleSummary, SummaryKey};

use crate::error::ApiError;
use crate::AppState;

/// Health check
pub async fn hello() -> Json<Value> {
    Json(serde_json::json!({ "msg": "Hello from backend" }))
}

/// Summary lookup parameters; the first non-blank of `pmid`, `pmc`,
/// `title` is used.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub pmid: Option<String>,
    pub pmc: Option<String>,
    pub title: Option<String>,
}

impl SummaryQuery {
    pub fn key(&self) -> Option<SummaryKey> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        present(&self.pmid)
            .map(SummaryKey::Pmid)
            .or_else(|| present(&self.pmc).map(SummaryKey::PmcId))
            .or_else(|| present(&self.title).map(SummaryKey::Title))
    }
}

/// Get the precomputed summary for one article
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ArticleSummary>, ApiError> {
    let key = query.key().ok_or_else(|| {
        ApiError::BadRequest("one of 'pmid', 'pmc' or 'title' is required".to_string())
    })?;

    let (name, value) = key.query_pair();
    match state.summaries.lookup(&key) {
        Some(summary) => {
            tracing::debug!(name, value, "summary served");
            Ok(Json(summary.clone()))
        }
        None => Err(ApiError::NotFound(format!(
            "no summary for {} '{}'",
            name, value
        ))),
    }
}

/// Listing of the stored summaries
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryListing {
    pub keys: Vec<String>,
    pub count: usize,
}

pub async fn list_summaries(State(state): State<Arc<AppState>>) -> Json<SummaryListing> {
    let keys = state.summaries.keys().to_vec();
    Json(SummaryListing {
        count: keys.len(),
        keys,
    })
}

/// Pull `sections` out of a request body as ordered `(name, text)` pairs.
///
/// The body is read leniently: anything that is not a JSON object with a
/// `sections` object is the same bad request.
fn request_sections(body: &[u8]) -> Result<Vec<(String, String)>, ApiError> {
    let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let Some(Value::Object(map)) = value.get("sections") else {
        return Err(ApiError::BadRequest(
            "'sections' must be an object".to_string(),
        ));
    };
    Ok(map
        .iter()
        .map(|(name, text)| {
            let text = match text {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name.clone(), text)
        })
        .collect())
}

/// Build the summarization prompt for `{"sections": {...}}`
pub async fn build_prompt(body: Bytes) -> Result<Json<Value>, ApiError> {
    let normalized = sections::normalize_sections(request_sections(&body)?);
    let prompt = sections::build_prompt(&normalized);
    tracing::debug!(sections = normalized.len(), chars = prompt.len(), "prompt built");
    Ok(Json(serde_json::json!({ "prompt": prompt })))
}

/// Canonicalize section names for `{"sections": {...}}`
pub async fn normalize_sections(body: Bytes) -> Result<Json<Value>, ApiError> {
    let normalized: Map<String, Value> = sections::normalize_sections(request_sections(&body)?)
        .into_iter()
        .map(|(name, text)| (name, Value::String(text)))
        .collect();
    Ok(Json(serde_json::json!({ "sections": normalized })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_key_precedence() {
        let query = SummaryQuery {
            pmid: Some(" ".to_string()),
            pmc: Some("PMC1".to_string()),
            title: Some("T".to_string()),
        };
        assert_eq!(query.key(), Some(SummaryKey::PmcId("PMC1".to_string())));
        assert_eq!(SummaryQuery::default().key(), None);
    }

    #[test]
    fn sections_must_be_an_object() {
        assert!(request_sections(b"not json").is_err());
        assert!(request_sections(br#"{"sections": ["a"]}"#).is_err());
        let sections = request_sections(br#"{"sections": {"b": "x", "a": null, "c": 3}}"#).unwrap();
        assert_eq!(
            sections,
            vec![
                ("b".to_string(), "x".to_string()),
                ("a".to_string(), String::new()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }
}
