// =============================================================================
// CLEANER - Normalization, type parsing and de-duplication
// =============================================================================
//
// Nothing in here fails: text that does not parse becomes null.

use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{CleanTitle, RawTitle};

/// "September 25, 2021": full month name, one or two digit day, four digit year
const DATE_ADDED_FORMAT: &str = "%B %d, %Y";

/// chrono alone also takes abbreviated months, short or signed years and
/// loose spacing, so the shape is checked first
static DATE_ADDED_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(January|February|March|April|May|June|July|August|September|October|November|December) [0-9]{1,2}, [0-9]{4}$",
    )
    .expect("valid regex")
});

static FOUR_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").expect("valid regex"));

/// Trim surrounding whitespace, then map the empty string to null
pub fn normalize_field(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse the month-name date used by the catalog export
pub fn parse_date_added(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    if !DATE_ADDED_SHAPE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_ADDED_FORMAT).ok()
}

/// First run of four consecutive digits, as an integer
pub fn extract_release_year(value: Option<&str>) -> Option<i32> {
    FOUR_DIGITS
        .find(value?)
        .and_then(|m| m.as_str().parse().ok())
}

/// Normalize every field and parse the typed columns
pub fn clean_title(raw: RawTitle) -> CleanTitle {
    let raw = raw.map_fields(normalize_field);

    CleanTitle {
        date_added: parse_date_added(raw.date_added.as_deref()),
        release_year: extract_release_year(raw.release_year.as_deref()),
        show_id: raw.show_id,
        kind: raw.kind,
        title: raw.title,
        director: raw.director,
        cast: raw.cast,
        country: raw.country,
        rating: raw.rating,
        duration: raw.duration,
        listed_in: raw.listed_in,
        description: raw.description,
    }
}

/// Keep the first record (file order) for each show_id. A null show_id is
/// a key of its own, so at most one null-id record survives.
///
/// Returns the surviving records and how many were dropped.
pub fn dedup_by_show_id(titles: Vec<CleanTitle>) -> (Vec<CleanTitle>, usize) {
    let before = titles.len();
    let mut seen: HashSet<Option<String>> = HashSet::with_capacity(before);

    let kept: Vec<CleanTitle> = titles
        .into_iter()
        .filter(|t| seen.insert(t.show_id.clone()))
        .collect();

    let dropped = before - kept.len();
    (kept, dropped)
}
