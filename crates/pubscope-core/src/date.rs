//! Lenient calendar-day parsing for publication dates and filter bounds.
//!
//! Every date comparison in the crate happens on calendar days. Time of day
//! and UTC offsets are discarded: `2014-08-18T23:30:00-05:00` is the 18th.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISO_DAY: Regex = Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ].*)?$").unwrap();
    static ref SLASH_DAY: Regex = Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").unwrap();
    static ref ISO_MONTH: Regex = Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap();
    static ref YEAR_ONLY: Regex = Regex::new(r"^(\d{4})$").unwrap();
    // PubMed style: "2014 Aug 18", "2014 Aug"
    static ref YEAR_MONTH_NAME: Regex =
        Regex::new(r"^(\d{4})\s+([A-Za-z]{3,})\.?(?:\s+(\d{1,2}))?$").unwrap();
    // "August 18, 2014", "Aug. 18 2014"
    static ref MONTH_NAME_FIRST: Regex =
        Regex::new(r"^([A-Za-z]{3,})\.?\s+(\d{1,2}),?\s+(\d{4})$").unwrap();
    // "18 Aug 2014"
    static ref DAY_FIRST: Regex = Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,})\.?,?\s+(\d{4})$").unwrap();
}

/// Parse a free-form date string into a calendar day.
///
/// Partial dates resolve to their first day (`2014-08` is August 1st,
/// `2014` is January 1st). Returns `None` for anything unrecognized.
pub fn parse_calendar_day(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(c) = ISO_DAY.captures(s) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = SLASH_DAY.captures(s) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = ISO_MONTH.captures(s) {
        return ymd(&c[1], &c[2], "1");
    }
    if let Some(c) = YEAR_ONLY.captures(s) {
        return ymd(&c[1], "1", "1");
    }
    if let Some(c) = YEAR_MONTH_NAME.captures(s) {
        let month = month_number(&c[2])?;
        let day = c.get(3).map(|m| m.as_str()).unwrap_or("1");
        return ymd(&c[1], &month.to_string(), day);
    }
    if let Some(c) = MONTH_NAME_FIRST.captures(s) {
        let month = month_number(&c[1])?;
        return ymd(&c[3], &month.to_string(), &c[2]);
    }
    if let Some(c) = DAY_FIRST.captures(s) {
        let month = month_number(&c[2])?;
        return ymd(&c[3], &month.to_string(), &c[1]);
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let n = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}
