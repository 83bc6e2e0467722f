//! AI summary model returned by the summary boundary and bundled as static data.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

lazy_static! {
    static ref OPENING_FENCE: Regex = Regex::new(r"^```(?:json)?\s*").unwrap();
    static ref CLOSING_FENCE: Regex = Regex::new(r"\s*```$").unwrap();
}

/// Section name used when a summary body could not be parsed as JSON.
pub const RAW_OUTPUT_SECTION: &str = "raw_output";

/// A per-article summary.
///
/// Every field is optional; an absent field means that part is simply not
/// rendered. Empty strings and empty lists are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    #[serde(
        alias = "summary",
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub overview: Option<String>,

    #[serde(
        alias = "keyFindings",
        default,
        deserialize_with = "non_empty_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_findings: Option<Vec<String>>,

    #[serde(
        default,
        deserialize_with = "non_empty_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub limitations: Option<Vec<String>>,

    #[serde(
        alias = "futureDirections",
        default,
        deserialize_with = "non_empty_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub future_directions: Option<Vec<String>>,

    /// Explicitly named section texts.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, String>,

    /// Any other top-level field. String values render as named sections.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ArticleSummary {
    /// Parse a summary body, tolerating markdown code fences and prose around
    /// the JSON object. Anything unparseable is kept as a raw-output section.
    pub fn parse_lenient(body: &str) -> Self {
        if let Ok(summary) = serde_json::from_str::<ArticleSummary>(body) {
            return summary;
        }

        let mut text = body.trim().to_string();
        if text.starts_with("```") {
            text = OPENING_FENCE.replace(&text, "").into_owned();
            text = CLOSING_FENCE.replace(&text, "").into_owned();
            if let Ok(summary) = serde_json::from_str::<ArticleSummary>(&text) {
                return summary;
            }
        }

        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if end > start {
                if let Ok(summary) = serde_json::from_str::<ArticleSummary>(&text[start..=end]) {
                    return summary;
                }
            }
        }

        let mut sections = BTreeMap::new();
        sections.insert(RAW_OUTPUT_SECTION.to_string(), body.to_string());
        Self {
            sections,
            ..Default::default()
        }
    }

    /// Named sections to render: the explicit `sections` map followed by any
    /// other non-blank string field.
    pub fn named_sections(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .sections
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(name, text)| (name.as_str(), text.as_str()))
            .collect();
        for (name, value) in &self.extra {
            if let serde_json::Value::String(text) = value {
                if !text.trim().is_empty() && !self.sections.contains_key(name) {
                    out.push((name.as_str(), text.as_str()));
                }
            }
        }
        out
    }

    /// Whether nothing renderable is present.
    pub fn is_empty(&self) -> bool {
        self.overview.is_none()
            && self.key_findings.is_none()
            && self.limitations.is_none()
            && self.future_directions.is_none()
            && self.named_sections().is_empty()
    }
}

fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn non_empty_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let value = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(value
        .map(|items| {
            items
                .into_iter()
                .filter(|item| !item.trim().is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|items| !items.is_empty()))
}
