//! Filter engine for the publications table.
//!
//! A record matches a [`FilterCriteria`] iff every active constraint holds:
//!
//! - `title`, `link`: case-insensitive substring
//! - `pmidMin`, `pmidMax`: inclusive numeric bounds on the coerced PMID
//! - `dateFrom`, `dateTo`: inclusive calendar-day bounds
//! - `includeTags`: all (or any, per `tagLogic`) must be present
//! - `excludeTags`: none may be present
//!
//! Empty fields impose no constraint. Bad record data never raises; it just
//! fails the constraint it was checked against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::parse_calendar_day;
use crate::domain::Publication;

/// How the include-tag set combines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagLogic {
    /// Every included tag must be on the record
    #[default]
    #[serde(rename = "ALL", alias = "all")]
    All,
    /// At least one included tag must be on the record
    #[serde(rename = "ANY", alias = "any")]
    Any,
}

/// The complete set of active filter constraints.
///
/// All text fields are free-form and unvalidated. The default value is the
/// canonical empty criteria, and clearing always returns to exactly this
/// shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub title: String,
    pub link: String,
    pub pmid_min: String,
    pub pmid_max: String,
    pub date_from: String,
    pub date_to: String,
    pub include_tags: Vec<String>,
    pub tag_logic: TagLogic,
    pub exclude_tags: Vec<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this criteria imposes no constraint at all.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty()
            && self.link.trim().is_empty()
            && self.pmid_min.trim().is_empty()
            && self.pmid_max.trim().is_empty()
            && self.date_from.trim().is_empty()
            && self.date_to.trim().is_empty()
            && normalized_tags(&self.include_tags).is_empty()
            && normalized_tags(&self.exclude_tags).is_empty()
    }

    /// Test a single record.
    pub fn matches(&self, record: &Publication) -> bool {
        self.compile().matches(record)
    }

    /// Resolve the free-form fields once so a full pass does not re-parse
    /// bounds per record.
    pub fn compile(&self) -> CompiledCriteria {
        CompiledCriteria {
            title: lowered(&self.title),
            link: lowered(&self.link),
            pmid_min: numeric_bound(&self.pmid_min),
            pmid_max: numeric_bound(&self.pmid_max),
            date_from: date_bound(&self.date_from),
            date_to: date_bound(&self.date_to),
            include_tags: normalized_tags(&self.include_tags),
            tag_logic: self.tag_logic,
            exclude_tags: normalized_tags(&self.exclude_tags),
        }
    }
}

/// Criteria with bounds parsed and needles lowercased.
///
/// A bound that does not parse is inactive.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCriteria {
    title: Option<String>,
    link: Option<String>,
    pmid_min: Option<f64>,
    pmid_max: Option<f64>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    include_tags: Vec<String>,
    tag_logic: TagLogic,
    exclude_tags: Vec<String>,
}

impl CompiledCriteria {
    pub fn matches(&self, record: &Publication) -> bool {
        self.matches_text(record)
            && self.matches_pmid(record)
            && self.matches_date(record)
            && self.matches_include_tags(record)
            && self.matches_exclude_tags(record)
    }

    fn matches_text(&self, record: &Publication) -> bool {
        if let Some(ref needle) = self.title {
            if !record.title.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(ref needle) = self.link {
            if !record.link.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }

    fn matches_pmid(&self, record: &Publication) -> bool {
        if self.pmid_min.is_none() && self.pmid_max.is_none() {
            return true;
        }
        let Some(pmid) = record.pmid.as_number() else {
            return false;
        };
        if let Some(min) = self.pmid_min {
            if pmid < min {
                return false;
            }
        }
        if let Some(max) = self.pmid_max {
            if pmid > max {
                return false;
            }
        }
        true
    }

    fn matches_date(&self, record: &Publication) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(day) = record.parsed_date() else {
            return false;
        };
        if let Some(from) = self.date_from {
            if day < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if day > to {
                return false;
            }
        }
        true
    }

    fn matches_include_tags(&self, record: &Publication) -> bool {
        if self.include_tags.is_empty() {
            return true;
        }
        let tags = record_tags(record);
        match self.tag_logic {
            TagLogic::All => self.include_tags.iter().all(|t| tags.contains(t)),
            TagLogic::Any => self.include_tags.iter().any(|t| tags.contains(t)),
        }
    }

    fn matches_exclude_tags(&self, record: &Publication) -> bool {
        if self.exclude_tags.is_empty() {
            return true;
        }
        let tags = record_tags(record);
        !self.exclude_tags.iter().any(|t| tags.contains(t))
    }
}

/// Filter a dataset, keeping dataset order.
pub fn filter_publications<'a>(
    records: &'a [Publication],
    criteria: &FilterCriteria,
) -> Vec<&'a Publication> {
    filter_indices(records, criteria)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}

/// Dataset indices of the matching records, in dataset order.
pub fn filter_indices(records: &[Publication], criteria: &FilterCriteria) -> Vec<usize> {
    let compiled = criteria.compile();
    let matched: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| compiled.matches(record))
        .map(|(i, _)| i)
        .collect();
    tracing::trace!(total = records.len(), matched = matched.len(), "filter pass");
    matched
}

fn lowered(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn numeric_bound(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn date_bound(s: &str) -> Option<NaiveDate> {
    parse_calendar_day(s)
}

fn normalized_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let t = tag.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn record_tags(record: &Publication) -> Vec<String> {
    record.tags.iter().map(|t| t.trim().to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Publication> {
        vec![
            Publication::new("Alpha", "https://example.org/a", "100")
                .with_date("2020-01-15")
                .with_tags(["genomics", "mice"]),
            Publication::new("Beta", "https://example.org/b", "200")
                .with_date("2021-06-01T23:59:00Z")
                .with_tags(["genomics", "retracted"]),
            Publication::new("Gamma", "https://other.net/g", "300")
                .with_date("2022-12-31")
                .with_tags(["plants"]),
        ]
    }

    fn titles(records: &[&Publication]) -> Vec<String> {
        records.iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn empty_criteria_matches_everything() {
        let data = sample();
        let criteria = FilterCriteria::default();
        assert!(criteria.is_empty());
        assert_eq!(filter_publications(&data, &criteria).len(), 3);
    }

    #[test]
    fn title_is_case_insensitive_substring() {
        let data = sample();
        let criteria = FilterCriteria {
            title: "AMM".to_string(),
            ..Default::default()
        };
        assert_eq!(titles(&filter_publications(&data, &criteria)), vec!["Gamma"]);
    }

    #[test]
    fn link_substring() {
        let data = sample();
        let criteria = FilterCriteria {
            link: "example.ORG".to_string(),
            ..Default::default()
        };
        assert_eq!(titles(&filter_publications(&data, &criteria)), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn pmid_bounds_are_inclusive() {
        let data = sample();
        let criteria = FilterCriteria {
            pmid_min: "100".to_string(),
            pmid_max: "200".to_string(),
            ..Default::default()
        };
        assert_eq!(titles(&filter_publications(&data, &criteria)), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn non_numeric_pmid_fails_active_bound() {
        let record = Publication::new("Odd", "", "pending");
        let bounded = FilterCriteria {
            pmid_min: "1".to_string(),
            ..Default::default()
        };
        assert!(!bounded.matches(&record));
        assert!(FilterCriteria::default().matches(&record));
    }

    #[test]
    fn unparseable_bound_is_inactive() {
        let data = sample();
        let criteria = FilterCriteria {
            pmid_min: "abc".to_string(),
            date_to: "someday".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_publications(&data, &criteria).len(), 3);
    }

    #[test]
    fn date_bounds_use_calendar_days() {
        let data = sample();
        // Beta's timestamp is late on 2021-06-01; it must still be inside a
        // range ending that day.
        let criteria = FilterCriteria {
            date_from: "2021-06-01".to_string(),
            date_to: "2021-06-01".to_string(),
            ..Default::default()
        };
        assert_eq!(titles(&filter_publications(&data, &criteria)), vec!["Beta"]);
    }

    #[test]
    fn missing_date_fails_active_date_bound() {
        let record = Publication::new("Undated", "", "1");
        let criteria = FilterCriteria {
            date_from: "2000-01-01".to_string(),
            ..Default::default()
        };
        assert!(!criteria.matches(&record));
    }

    #[test]
    fn include_all_vs_any() {
        let data = sample();
        let mut criteria = FilterCriteria {
            include_tags: vec!["genomics".to_string(), "mice".to_string()],
            ..Default::default()
        };
        assert_eq!(titles(&filter_publications(&data, &criteria)), vec!["Alpha"]);

        criteria.tag_logic = TagLogic::Any;
        assert_eq!(titles(&filter_publications(&data, &criteria)), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn exclude_wins_over_include() {
        let data = sample();
        let criteria = FilterCriteria {
            include_tags: vec!["genomics".to_string()],
            exclude_tags: vec!["Retracted".to_string()],
            ..Default::default()
        };
        assert_eq!(titles(&filter_publications(&data, &criteria)), vec!["Alpha"]);
    }

    #[test]
    fn blank_tags_are_ignored() {
        let criteria = FilterCriteria {
            include_tags: vec!["  ".to_string()],
            ..Default::default()
        };
        assert!(criteria.is_empty());
    }

    #[test]
    fn criteria_json_shape() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"title": "bone", "pmidMin": "150", "includeTags": ["mice"], "tagLogic": "ANY"}"#,
        )
        .unwrap();
        assert_eq!(criteria.title, "bone");
        assert_eq!(criteria.pmid_min, "150");
        assert_eq!(criteria.tag_logic, TagLogic::Any);
        assert!(criteria.exclude_tags.is_empty());
    }
}
