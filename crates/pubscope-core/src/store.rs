//! Static data store: the bundled publications and summaries JSON.
//!
//! Loaded once and read-only afterwards.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::config::DataConfig;
use crate::domain::Publication;
use crate::error::DataError;
use crate::summaries::SummaryIndex;

/// Everything the dashboard reads at load time.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub publications: Arc<[Publication]>,
    pub summaries: SummaryIndex,
}

impl Dataset {
    /// Load both collections from the configured paths. A missing summaries
    /// path gives an empty summary index.
    pub fn load(config: &DataConfig) -> Result<Self, DataError> {
        let publications = load_publications(&config.publications)?;
        let summaries = match config.summaries {
            Some(ref path) => load_summaries(path)?,
            None => SummaryIndex::new(),
        };
        Ok(Self {
            publications: publications.into(),
            summaries,
        })
    }

    pub fn from_json_strs(publications: &str, summaries: Option<&str>) -> Result<Self, DataError> {
        let publications = parse_publications(publications, "publications")?;
        let summaries = match summaries {
            Some(json) => SummaryIndex::from_json_str(json, "summaries")?,
            None => SummaryIndex::new(),
        };
        Ok(Self {
            publications: publications.into(),
            summaries,
        })
    }
}

fn read(path: &Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_publications(path: &Path) -> Result<Vec<Publication>, DataError> {
    let json = read(path)?;
    parse_publications(&json, &path.display().to_string())
}

pub fn load_summaries(path: &Path) -> Result<SummaryIndex, DataError> {
    let json = read(path)?;
    SummaryIndex::from_json_str(&json, &path.display().to_string())
}

/// Parse the publications JSON: an array of records, or an object with a
/// `publications` array. Entries that are not valid records are skipped
/// with a warning rather than failing the whole load.
pub fn parse_publications(json: &str, origin: &str) -> Result<Vec<Publication>, DataError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|source| DataError::Json {
        origin: origin.to_string(),
        source,
    })?;

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(mut map) => match map.remove("publications") {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => {
                return Err(DataError::Shape {
                    origin: origin.to_string(),
                    message: "expected an array or an object with a `publications` array"
                        .to_string(),
                })
            }
        },
        _ => {
            return Err(DataError::Shape {
                origin: origin.to_string(),
                message: "expected an array of publications".to_string(),
            })
        }
    };

    let mut publications = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Publication>(entry) {
            Ok(record) => publications.push(record),
            Err(e) => tracing::warn!(origin, position, "skipping publication: {}", e),
        }
    }

    // PMIDs are assumed unique; duplicates are reported, not rejected.
    let mut seen = HashSet::new();
    let duplicates = publications
        .iter()
        .filter(|p| !p.pmid.is_blank() && !seen.insert(p.pmid.as_str().trim()))
        .count();
    if duplicates > 0 {
        tracing::warn!(origin, duplicates, "duplicate PMIDs in publications");
    }

    tracing::info!(origin, count = publications.len(), "loaded publications");
    Ok(publications)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_shape() {
        let json = r#"[{"Title": "A", "Link": "l", "PMID": 1}, {"Title": "B", "Link": "l", "PMID": "2"}]"#;
        let records = parse_publications(json, "test").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].pmid.as_str(), "2");
    }

    #[test]
    fn wrapped_shape() {
        let json = r#"{"publications": [{"title": "A", "link": "l", "pmid": 1}]}"#;
        assert_eq!(parse_publications(json, "test").unwrap().len(), 1);
    }

    #[test]
    fn bad_entries_are_skipped() {
        let json = r#"[{"Title": "A", "PMID": 1}, 17, {"Title": ["not", "text"]}]"#;
        let records = parse_publications(json, "test").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(matches!(
            parse_publications(r#"{"items": []}"#, "test"),
            Err(DataError::Shape { .. })
        ));
        assert!(matches!(
            parse_publications("not json", "test"),
            Err(DataError::Json { .. })
        ));
    }

    #[test]
    fn dataset_from_strings() {
        let dataset = Dataset::from_json_strs(
            r#"[{"Title": "A", "PMID": 1}]"#,
            Some(r#"{"1": {"overview": "x"}}"#),
        )
        .unwrap();
        assert_eq!(dataset.publications.len(), 1);
        assert_eq!(dataset.summaries.len(), 1);
    }
}
