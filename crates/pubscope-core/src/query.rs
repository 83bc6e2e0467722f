//! Search-bar syntax for building filter criteria from one line of text.
//!
//! # Syntax
//!
//! ```text
//! tags:genomics -tags:retracted pmid>=20000000 from:2015 "bone loss"
//! ```
//!
//! Tokens:
//! - `tags:a` / `tag:a`: include tag
//! - `tags:a+b`: include both tags
//! - `tags:a|b`: include either tag (switches tag logic to ANY)
//! - `-tags:a`: exclude tag
//! - `pmid>=N`, `pmid<=N`, `pmid:N-M`: inclusive PMID bounds (a bare `>`
//!   or `<` is not an operator, so `pmid>N` stays title text)
//! - `from:DATE`, `to:DATE`: date bounds
//! - `link:TEXT`: link substring
//! - Everything else: joined into the title substring

use lazy_static::lazy_static;
use regex::Regex;

use crate::filter::{FilterCriteria, TagLogic};

lazy_static! {
    static ref PMID_MIN: Regex = Regex::new(r"(?i)^pmid>=(\S+)$").unwrap();
    static ref PMID_MAX: Regex = Regex::new(r"(?i)^pmid<=(\S+)$").unwrap();
    static ref PMID_RANGE: Regex = Regex::new(r"(?i)^pmid:(\d*)-(\d*)$").unwrap();
}

/// Parse a search-bar expression into criteria.
///
/// Nothing is validated; bound values are copied verbatim into the
/// free-form criteria fields.
pub fn parse_search_query(input: &str) -> FilterCriteria {
    let mut criteria = FilterCriteria::default();
    let mut title_terms: Vec<String> = Vec::new();

    for token in tokenize(input) {
        // Exclusions
        if let Some(rest) = strip_any_prefix(&token, &["-tags:", "-tag:"]) {
            push_tags(&mut criteria.exclude_tags, rest.split(['+', '|']));
            continue;
        }

        // Inclusions
        if let Some(rest) = strip_any_prefix(&token, &["tags:", "tag:"]) {
            if rest.contains('|') {
                criteria.tag_logic = TagLogic::Any;
                push_tags(&mut criteria.include_tags, rest.split('|'));
            } else {
                push_tags(&mut criteria.include_tags, rest.split('+'));
            }
            continue;
        }

        if let Some(c) = PMID_RANGE.captures(&token) {
            criteria.pmid_min = c[1].to_string();
            criteria.pmid_max = c[2].to_string();
            continue;
        }
        if let Some(c) = PMID_MIN.captures(&token) {
            criteria.pmid_min = c[1].to_string();
            continue;
        }
        if let Some(c) = PMID_MAX.captures(&token) {
            criteria.pmid_max = c[1].to_string();
            continue;
        }

        if let Some(rest) = strip_any_prefix(&token, &["from:"]) {
            criteria.date_from = rest.to_string();
            continue;
        }
        if let Some(rest) = strip_any_prefix(&token, &["to:"]) {
            criteria.date_to = rest.to_string();
            continue;
        }
        if let Some(rest) = strip_any_prefix(&token, &["link:"]) {
            criteria.link = rest.to_string();
            continue;
        }

        title_terms.push(token);
    }

    criteria.title = title_terms.join(" ");
    criteria
}

/// Render criteria back into search-bar syntax.
pub fn format_search_query(criteria: &FilterCriteria) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !criteria.title.trim().is_empty() {
        parts.push(quote_if_needed(criteria.title.trim()));
    }
    if !criteria.link.trim().is_empty() {
        parts.push(format!("link:{}", quote_if_needed(criteria.link.trim())));
    }

    let min = criteria.pmid_min.trim();
    let max = criteria.pmid_max.trim();
    let numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !min.is_empty() && !max.is_empty() && numeric(min) && numeric(max) {
        parts.push(format!("pmid:{}-{}", min, max));
    } else {
        if !min.is_empty() {
            parts.push(format!("pmid>={}", min));
        }
        if !max.is_empty() {
            parts.push(format!("pmid<={}", max));
        }
    }

    if !criteria.date_from.trim().is_empty() {
        parts.push(format!("from:{}", quote_if_needed(criteria.date_from.trim())));
    }
    if !criteria.date_to.trim().is_empty() {
        parts.push(format!("to:{}", quote_if_needed(criteria.date_to.trim())));
    }

    let include: Vec<&str> = criteria
        .include_tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !include.is_empty() {
        let joiner = match criteria.tag_logic {
            TagLogic::All => "+",
            TagLogic::Any => "|",
        };
        parts.push(format!("tags:{}", quote_if_needed(&include.join(joiner))));
    }

    for tag in criteria.exclude_tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        parts.push(format!("-tags:{}", quote_if_needed(tag)));
    }

    parts.join(" ")
}

fn strip_any_prefix<'a>(token: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| {
        let head = token.get(..p.len())?;
        if head.eq_ignore_ascii_case(p) {
            token.get(p.len()..)
        } else {
            None
        }
    })
}

fn push_tags<'a>(target: &mut Vec<String>, tags: impl Iterator<Item = &'a str>) {
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !target.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            target.push(tag.to_string());
        }
    }
}

fn quote_if_needed(s: &str) -> String {
    if s.contains(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// Tokenize a search string, respecting quoted strings.
///
/// A quote in the middle of a token (`from:"2014 Aug"`) groups the rest of
/// that token.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                if !in_quotes && !current.is_empty() {
                    tokens.push(current.clone());
                    current.clear();
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(current.clone());
                    current.clear();
                }
            }
            _ => {
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
