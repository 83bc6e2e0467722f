//! Sort engine for the publications table.
//!
//! One sort key is active at a time. Sorting decorates each record with its
//! input position and the extracted key, so ties always fall back to the
//! input order no matter which direction is active.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::Publication;

/// Sortable columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Title,
    Link,
    Pmid,
    PublicationDate,
    Authors,
    PmcId,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Title,
        SortField::Link,
        SortField::Pmid,
        SortField::PublicationDate,
        SortField::Authors,
        SortField::PmcId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Link => "link",
            SortField::Pmid => "pmid",
            SortField::PublicationDate => "publication_date",
            SortField::Authors => "authors",
            SortField::PmcId => "pmc_id",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "title" => Ok(SortField::Title),
            "link" | "url" => Ok(SortField::Link),
            "pmid" => Ok(SortField::Pmid),
            "publication_date" | "date" | "pub_date" => Ok(SortField::PublicationDate),
            "authors" | "author" => Ok(SortField::Authors),
            "pmc_id" | "pmcid" | "pmc" => Ok(SortField::PmcId),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The active sort: a field and a direction. Defaults to title ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: SortField) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Column-header click: the same field flips direction, a new field
    /// starts ascending.
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::ascending(field)
        }
    }
}

enum Decorated<'a> {
    Text(&'a str),
    Day(Option<NaiveDate>),
}

fn decorate(record: &Publication, field: SortField) -> Decorated<'_> {
    match field {
        SortField::Title => Decorated::Text(&record.title),
        SortField::Link => Decorated::Text(&record.link),
        SortField::Pmid => Decorated::Text(record.pmid.as_str()),
        SortField::PublicationDate => Decorated::Day(record.parsed_date()),
        SortField::Authors => Decorated::Text(record.authors.as_deref().unwrap_or("")),
        SortField::PmcId => Decorated::Text(record.pmc_id.as_deref().unwrap_or("")),
    }
}

fn compare_keys(a: &Decorated<'_>, b: &Decorated<'_>) -> Ordering {
    match (a, b) {
        (Decorated::Text(a), Decorated::Text(b)) => natural_cmp(a, b),
        // Missing dates sort before present ones.
        (Decorated::Day(a), Decorated::Day(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Order `records` by `key`. Equal keys keep their input order.
pub fn sort_publications<'a>(records: &[&'a Publication], key: SortKey) -> Vec<&'a Publication> {
    let mut decorated: Vec<(usize, Decorated<'a>, &'a Publication)> = records
        .iter()
        .enumerate()
        .map(|(i, &record)| (i, decorate(record, key.field), record))
        .collect();

    decorated.sort_by(|(ia, ka, _), (ib, kb, _)| {
        key.direction
            .apply(compare_keys(ka, kb))
            .then_with(|| ia.cmp(ib))
    });

    decorated.into_iter().map(|(_, _, record)| record).collect()
}

/// Order a list of dataset indices by `key`. Equal keys keep the order of
/// `indices`.
pub fn sort_indices(records: &[Publication], indices: &[usize], key: SortKey) -> Vec<usize> {
    let mut decorated: Vec<(usize, Decorated<'_>, usize)> = indices
        .iter()
        .enumerate()
        .map(|(pos, &i)| (pos, decorate(&records[i], key.field), i))
        .collect();

    decorated.sort_by(|(pa, ka, _), (pb, kb, _)| {
        key.direction
            .apply(compare_keys(ka, kb))
            .then_with(|| pa.cmp(pb))
    });

    decorated.into_iter().map(|(_, _, i)| i).collect()
}

#[derive(Debug, PartialEq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        out.push(make_chunk(&s[start..], prev));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Case and accent folded: `É` compares as `e`.
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let mut ai = folded(a);
    let mut bi = folded(b);
    loop {
        match (ai.next(), bi.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x != y => return x.cmp(&y),
            _ => {}
        }
    }
}

/// Tiebreak for strings that compare equal ignoring case and digit padding:
/// first differing character decides, lowercase before uppercase.
fn compare_variant(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        let same_letter = x.to_lowercase().eq(y.to_lowercase());
        if same_letter {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
        return x.cmp(&y);
    }
    a.len().cmp(&b.len())
}

/// Numeric-aware, case- and accent-insensitive string comparison:
/// `"PMC2" < "PMC10"`, `"alpha" < "Beta"`, `"Éclair" < "Zebra"`.
///
/// Distinct strings never compare equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);

    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => compare_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => compare_text(x, y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    ca.len()
        .cmp(&cb.len())
        .then_with(|| compare_variant(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_numbers() {
        assert_eq!(natural_cmp("PMC2", "PMC10"), Ordering::Less);
        assert_eq!(natural_cmp("PMC10", "PMC2"), Ordering::Greater);
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
        assert_eq!(natural_cmp("item 007", "item 8"), Ordering::Less);
    }

    #[test]
    fn natural_case_insensitive() {
        assert_eq!(natural_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(natural_cmp("Beta", "alpha"), Ordering::Greater);
        assert_eq!(natural_cmp("apple", "Apple"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn natural_folds_accents() {
        assert_eq!(natural_cmp("Éclair", "Zebra"), Ordering::Less);
        assert_eq!(natural_cmp("Ångström", "Beta"), Ordering::Less);
        assert_eq!(natural_cmp("résumé", "result"), Ordering::Greater);
        assert_ne!(natural_cmp("Eclair", "Éclair"), Ordering::Equal);
    }

    #[test]
    fn natural_is_total_on_distinct_strings() {
        assert_ne!(natural_cmp("a01", "a1"), Ordering::Equal);
        assert_ne!(natural_cmp("A", "a"), Ordering::Equal);
    }

    #[test]
    fn toggle_rules() {
        let key = SortKey::default();
        assert_eq!(key, SortKey::ascending(SortField::Title));

        let flipped = key.toggle(SortField::Title);
        assert_eq!(flipped.direction, SortDirection::Descending);

        let moved = flipped.toggle(SortField::Pmid);
        assert_eq!(moved, SortKey::ascending(SortField::Pmid));
    }

    #[test]
    fn dates_sort_missing_first() {
        let a = Publication::new("a", "", "1").with_date("2021-01-01");
        let b = Publication::new("b", "", "2");
        let c = Publication::new("c", "", "3").with_date("2019-05-05");
        let d = Publication::new("d", "", "4").with_date("garbage");
        let records = vec![&a, &b, &c, &d];

        let asc = sort_publications(&records, SortKey::ascending(SortField::PublicationDate));
        let names: Vec<&str> = asc.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "c", "a"]);

        let desc = sort_publications(&records, SortKey::descending(SortField::PublicationDate));
        let names: Vec<&str> = desc.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let a = Publication::new("Same", "", "1");
        let b = Publication::new("Same", "", "2");
        let c = Publication::new("Other", "", "3");
        let records = vec![&a, &b, &c];

        let asc = sort_publications(&records, SortKey::ascending(SortField::Title));
        let pmids: Vec<&str> = asc.iter().map(|p| p.pmid.as_str()).collect();
        assert_eq!(pmids, vec!["3", "1", "2"]);

        let desc = sort_publications(&records, SortKey::descending(SortField::Title));
        let pmids: Vec<&str> = desc.iter().map(|p| p.pmid.as_str()).collect();
        assert_eq!(pmids, vec!["1", "2", "3"]);
    }

    #[test]
    fn pmc_ids_sort_numerically() {
        let a = Publication::new("a", "", "1").with_pmc_id("PMC10");
        let b = Publication::new("b", "", "2").with_pmc_id("PMC2");
        let records = vec![&a, &b];
        let sorted = sort_publications(&records, SortKey::ascending(SortField::PmcId));
        assert_eq!(sorted[0].title, "b");
    }

    #[test]
    fn sort_indices_matches_sort_publications() {
        let data = vec![
            Publication::new("Gamma", "", "300"),
            Publication::new("Alpha", "", "100"),
            Publication::new("Beta", "", "200"),
        ];
        let sorted = sort_indices(&data, &[0, 1, 2], SortKey::ascending(SortField::Title));
        assert_eq!(sorted, vec![1, 2, 0]);
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("date".parse::<SortField>(), Ok(SortField::PublicationDate));
        assert_eq!("PMC-ID".parse::<SortField>(), Ok(SortField::PmcId));
        assert!("color".parse::<SortField>().is_err());
    }
}
