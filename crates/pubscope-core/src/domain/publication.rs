//! Publication domain model

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date::parse_calendar_day;

/// PubMed identifier as it appeared in the source data.
///
/// The bundled data is CSV-derived, so the identifier arrives either as a
/// JSON string or as a JSON number. The raw text is kept for display and for
/// numeric-aware sorting; [`Pmid::as_number`] gives the coerced value used by
/// range filters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pmid(String);

impl Pmid {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Coerce to a number. Blank or non-numeric text gives `None`.
    pub fn as_number(&self) -> Option<f64> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Pmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pmid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for Pmid {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for Pmid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Pmid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
            Float(f64),
            Null(()),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Pmid(s),
            Raw::Unsigned(n) => Pmid(n.to_string()),
            Raw::Signed(n) => Pmid(n.to_string()),
            Raw::Float(n) => Pmid(n.to_string()),
            Raw::Null(()) => Pmid(String::new()),
        })
    }
}

/// A single bibliographic record from the bundled publications data.
///
/// Records are immutable after load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(alias = "Title", default)]
    pub title: String,

    #[serde(alias = "Link", alias = "URL", alias = "url", default)]
    pub link: String,

    #[serde(alias = "PMID", default)]
    pub pmid: Pmid,

    #[serde(
        alias = "Publication Date",
        alias = "PublicationDate",
        alias = "publicationDate",
        alias = "pub_date",
        alias = "release_date",
        alias = "Date",
        alias = "date",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub publication_date: Option<String>,

    #[serde(
        alias = "Authors",
        default,
        deserialize_with = "optional_joined_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub authors: Option<String>,

    #[serde(
        rename = "abstract",
        alias = "Abstract",
        alias = "abstract_text",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_text: Option<String>,

    #[serde(
        alias = "PMCID",
        alias = "PMC ID",
        alias = "PMC",
        alias = "pmcid",
        alias = "pmcId",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub pmc_id: Option<String>,

    #[serde(
        alias = "Tags",
        alias = "keywords",
        alias = "Keywords",
        default,
        deserialize_with = "tag_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

impl Publication {
    /// Create a record with the required fields
    pub fn new(title: impl Into<String>, link: impl Into<String>, pmid: impl Into<Pmid>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            pmid: pmid.into(),
            ..Default::default()
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.publication_date = Some(date.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pmc_id(mut self, pmc_id: impl Into<String>) -> Self {
        self.pmc_id = Some(pmc_id.into());
        self
    }

    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    /// Publication date as a calendar day, if it parses.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.publication_date.as_deref().and_then(parse_calendar_day)
    }

    pub fn year(&self) -> Option<i32> {
        self.parsed_date().map(|d| d.year())
    }

    /// Whether the record carries `tag` (trimmed, case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        self.tags.iter().any(|t| t.trim().to_lowercase() == wanted)
    }
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Authors arrive either as one string or as a list of names.
fn optional_joined_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Array(items) => {
            let names: Vec<String> = items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::trim).map(str::to_string))
                .filter(|name| !name.is_empty())
                .collect();
            if names.is_empty() {
                None
            } else {
                Some(names.join("; "))
            }
        }
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }))
}

/// Tags arrive either as a list or as one comma/semicolon separated string.
fn tag_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let raw: Vec<String> = match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(s)) => s
            .split([',', ';'])
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    Ok(raw
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}
