//! Precomputed summaries keyed by PMID, PMC id, or title.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ArticleSummary, Publication};
use crate::error::DataError;

/// How a summary is requested from the store or the summary endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKey {
    Pmid(String),
    PmcId(String),
    Title(String),
}

impl SummaryKey {
    /// Best key for a record: PMID, then PMC id, then title.
    pub fn for_publication(record: &Publication) -> Option<Self> {
        if !record.pmid.is_blank() {
            return Some(SummaryKey::Pmid(record.pmid.as_str().trim().to_string()));
        }
        if let Some(pmc) = record.pmc_id.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(SummaryKey::PmcId(pmc.trim().to_string()));
        }
        if !record.title.trim().is_empty() {
            return Some(SummaryKey::Title(record.title.clone()));
        }
        None
    }

    /// Classify a bare identifier: `PMC…` is a PMC id, digits are a PMID,
    /// anything else is a title.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.len() > 3 && has_pmc_prefix(trimmed) {
            SummaryKey::PmcId(trimmed.to_string())
        } else if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            SummaryKey::Pmid(trimmed.to_string())
        } else {
            SummaryKey::Title(trimmed.to_string())
        }
    }

    /// Query parameter name and value for the summary endpoint.
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            SummaryKey::Pmid(v) => ("pmid", v),
            SummaryKey::PmcId(v) => ("pmc", v),
            SummaryKey::Title(v) => ("title", v),
        }
    }
}

/// Normalize a PMC id to `PMC<digits>` form. `4136787`, `pmc4136787` and
/// `PMC4136787` are the same article.
pub fn normalize_pmc_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits = if has_pmc_prefix(trimmed) {
        &trimmed[3..]
    } else {
        trimmed
    };
    format!("PMC{}", digits.trim())
}

fn has_pmc_prefix(s: &str) -> bool {
    s.get(..3).is_some_and(|head| head.eq_ignore_ascii_case("pmc"))
}

/// Case-folded, whitespace-collapsed title for lookups.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalize_pmid(raw: &str) -> String {
    raw.trim().to_string()
}

/// In-memory summary store, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct SummaryIndex {
    summaries: Vec<ArticleSummary>,
    by_pmid: HashMap<String, usize>,
    by_pmc: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
    keys: Vec<String>,
}

const PMID_FIELDS: &[&str] = &["PMID", "pmid", "Pmid"];
const PMC_FIELDS: &[&str] = &["PMCID", "pmcid", "pmc_id", "pmcId", "PMC", "pmc"];
const TITLE_FIELDS: &[&str] = &["Title", "title"];

impl SummaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the summaries JSON: either an object keyed by PMID / PMC id /
    /// title, or an array of entries carrying their own identifiers.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, DataError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|source| DataError::Json {
                origin: origin.to_string(),
                source,
            })?;

        let mut index = Self::new();
        match value {
            serde_json::Value::Object(map) => {
                for (key, body) in map {
                    match serde_json::from_value::<ArticleSummary>(unwrap_nested(body)) {
                        Ok(summary) => index.insert(SummaryKey::classify(&key), summary),
                        Err(e) => tracing::warn!(origin, key = %key, "skipping summary: {}", e),
                    }
                }
            }
            serde_json::Value::Array(entries) => {
                for (position, entry) in entries.into_iter().enumerate() {
                    if let Err(e) = index.insert_entry(entry) {
                        tracing::warn!(origin, position, "skipping summary entry: {}", e);
                    }
                }
            }
            _ => {
                return Err(DataError::Shape {
                    origin: origin.to_string(),
                    message: "expected an object or an array of summaries".to_string(),
                })
            }
        }

        tracing::info!(origin, count = index.len(), "loaded summaries");
        Ok(index)
    }

    /// Index one summary under a key.
    pub fn insert(&mut self, key: SummaryKey, summary: ArticleSummary) {
        let slot = self.summaries.len();
        self.summaries.push(summary);
        self.link(&key, slot);
        self.keys.push(key.query_pair().1.to_string());
    }

    fn insert_entry(&mut self, entry: serde_json::Value) -> Result<(), String> {
        let serde_json::Value::Object(mut map) = entry else {
            return Err("entry is not an object".to_string());
        };

        let mut keys: Vec<SummaryKey> = Vec::new();
        if let Some(v) = take_text(&mut map, PMID_FIELDS) {
            keys.push(SummaryKey::Pmid(v));
        }
        if let Some(v) = take_text(&mut map, PMC_FIELDS) {
            keys.push(SummaryKey::PmcId(v));
        }
        if let Some(v) = take_text(&mut map, TITLE_FIELDS) {
            keys.push(SummaryKey::Title(v));
        }
        if keys.is_empty() {
            return Err("entry has no PMID, PMC id, or title".to_string());
        }

        let summary: ArticleSummary =
            serde_json::from_value(unwrap_nested(serde_json::Value::Object(map)))
                .map_err(|e| e.to_string())?;

        let slot = self.summaries.len();
        self.summaries.push(summary);
        for key in &keys {
            self.link(key, slot);
        }
        self.keys.push(keys[0].query_pair().1.to_string());
        Ok(())
    }

    fn link(&mut self, key: &SummaryKey, slot: usize) {
        match key {
            SummaryKey::Pmid(v) => {
                self.by_pmid.insert(normalize_pmid(v), slot);
            }
            SummaryKey::PmcId(v) => {
                self.by_pmc.insert(normalize_pmc_id(v), slot);
            }
            SummaryKey::Title(v) => {
                self.by_title.insert(normalize_title(v), slot);
            }
        }
    }

    pub fn lookup(&self, key: &SummaryKey) -> Option<&ArticleSummary> {
        let slot = match key {
            SummaryKey::Pmid(v) => self.by_pmid.get(&normalize_pmid(v)),
            SummaryKey::PmcId(v) => self.by_pmc.get(&normalize_pmc_id(v)),
            SummaryKey::Title(v) => self.by_title.get(&normalize_title(v)),
        }?;
        self.summaries.get(*slot)
    }

    /// Look up a record by any of its identifiers.
    pub fn lookup_publication(&self, record: &Publication) -> Option<&ArticleSummary> {
        let mut candidates = Vec::new();
        if !record.pmid.is_blank() {
            candidates.push(SummaryKey::Pmid(record.pmid.as_str().to_string()));
        }
        if let Some(pmc) = record.pmc_id.as_deref() {
            candidates.push(SummaryKey::PmcId(pmc.to_string()));
        }
        candidates.push(SummaryKey::Title(record.title.clone()));
        candidates.iter().find_map(|key| self.lookup(key))
    }

    /// Primary identifier of each summary, in load order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

/// Entries sometimes wrap the summary under a `summary` object.
fn unwrap_nested(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut map) if matches!(map.get("summary"), Some(serde_json::Value::Object(_))) => {
            map.remove("summary").unwrap_or_default()
        }
        other => other,
    }
}

fn take_text(map: &mut serde_json::Map<String, serde_json::Value>, fields: &[&str]) -> Option<String> {
    let mut found = None;
    for field in fields {
        if let Some(value) = map.remove(*field) {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if found.is_none() && !text.trim().is_empty() {
                found = Some(text.trim().to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_keys() {
        assert_eq!(SummaryKey::classify("PMC123"), SummaryKey::PmcId("PMC123".into()));
        assert_eq!(SummaryKey::classify("123"), SummaryKey::Pmid("123".into()));
        assert_eq!(SummaryKey::classify("Bone loss"), SummaryKey::Title("Bone loss".into()));
    }

    #[test]
    fn key_for_publication_prefers_pmid() {
        let p = Publication::new("Title", "", "42").with_pmc_id("PMC9");
        assert_eq!(SummaryKey::for_publication(&p), Some(SummaryKey::Pmid("42".into())));

        let p = Publication::new("Title", "", "").with_pmc_id("PMC9");
        assert_eq!(SummaryKey::for_publication(&p), Some(SummaryKey::PmcId("PMC9".into())));

        let p = Publication::new("Title", "", "");
        assert_eq!(SummaryKey::for_publication(&p), Some(SummaryKey::Title("Title".into())));
    }

    #[test]
    fn pmc_normalization() {
        assert_eq!(normalize_pmc_id("4136787"), "PMC4136787");
        assert_eq!(normalize_pmc_id(" pmc4136787 "), "PMC4136787");
    }

    #[test]
    fn keyed_object_shape() {
        let json = r#"{
            "25133378": {"summary": "By PMID"},
            "PMC4136787": {"summary": {"overview": "Nested by PMC"}}
        }"#;
        let index = SummaryIndex::from_json_str(json, "test").unwrap();
        assert_eq!(index.len(), 2);
        let by_pmid = index.lookup(&SummaryKey::Pmid("25133378".into())).unwrap();
        assert_eq!(by_pmid.overview.as_deref(), Some("By PMID"));
        let by_pmc = index.lookup(&SummaryKey::PmcId("pmc4136787".into())).unwrap();
        assert_eq!(by_pmc.overview.as_deref(), Some("Nested by PMC"));
    }

    #[test]
    fn array_shape_indexes_every_identifier() {
        let json = r#"[
            {"PMID": 1, "PMCID": "PMC10", "Title": "Mice  in Orbit", "overview": "One"},
            {"overview": "No id"},
            "not an object"
        ]"#;
        let index = SummaryIndex::from_json_str(json, "test").unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.lookup(&SummaryKey::Pmid("1".into())).is_some());
        assert!(index.lookup(&SummaryKey::PmcId("10".into())).is_some());
        assert!(index.lookup(&SummaryKey::Title("mice in orbit".into())).is_some());
        assert_eq!(index.keys(), &["1".to_string()]);
    }

    #[test]
    fn lookup_publication_falls_back_to_title() {
        let mut index = SummaryIndex::new();
        index.insert(
            SummaryKey::Title("Plant Growth".into()),
            ArticleSummary {
                overview: Some("Roots".into()),
                ..Default::default()
            },
        );
        let p = Publication::new("plant growth", "", "77");
        assert!(index.lookup_publication(&p).is_some());
    }

    #[test]
    fn scalar_json_is_rejected() {
        assert!(matches!(
            SummaryIndex::from_json_str("42", "test"),
            Err(DataError::Shape { .. })
        ));
        assert!(matches!(
            SummaryIndex::from_json_str("{", "test"),
            Err(DataError::Json { .. })
        ));
    }
}
