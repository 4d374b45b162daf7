// =============================================================================
// FILTER + ENRICHER
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{CleanTitle, EnrichedTitle};

/// Release year cutoff applied unless configured otherwise
pub const DEFAULT_MIN_RELEASE_YEAR: i32 = 2015;

/// Runtime at or above which a movie counts as long
pub const LONG_MOVIE_MINUTES: i32 = 120;

pub const TYPE_MOVIE: &str = "Movie";
pub const TYPE_TV_SHOW: &str = "TV Show";

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Known release year at or after `min_year`
pub fn is_recent(title: &CleanTitle, min_year: i32) -> bool {
    matches!(title.release_year, Some(year) if year >= min_year)
}

/// First integer in a duration like "3 Seasons" or "130 min". Values that
/// do not fit an i32 are treated as absent.
pub fn first_integer(value: Option<&str>) -> Option<i32> {
    DIGITS.find(value?).and_then(|m| m.as_str().parse().ok())
}

/// Derive the business attributes for one record
pub fn enrich_title(title: CleanTitle) -> EnrichedTitle {
    let kind = title.kind.as_deref();
    let duration_number = first_integer(title.duration.as_deref());

    let season_count = if kind == Some(TYPE_TV_SHOW) {
        duration_number
    } else {
        None
    };
    let minutes = if kind == Some(TYPE_MOVIE) {
        duration_number
    } else {
        None
    };
    let is_long_movie =
        kind == Some(TYPE_MOVIE) && matches!(minutes, Some(m) if m >= LONG_MOVIE_MINUTES);

    EnrichedTitle {
        content_type: title.kind.as_ref().map(|k| k.to_lowercase()),
        rating_clean: title.rating.as_ref().map(|r| r.to_lowercase()),
        season_count,
        minutes,
        is_long_movie,
        dq_missing_core: title.title.is_none() || title.description.is_none(),
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(kind: Option<&str>, duration: Option<&str>) -> CleanTitle {
        CleanTitle {
            show_id: Some("s1".to_string()),
            kind: kind.map(str::to_string),
            title: Some("Some Title".to_string()),
            director: None,
            cast: None,
            country: None,
            date_added: None,
            release_year: Some(2020),
            rating: Some("TV-MA".to_string()),
            duration: duration.map(str::to_string),
            listed_in: None,
            description: Some("A description".to_string()),
        }
    }

    fn with_year(year: Option<i32>) -> CleanTitle {
        CleanTitle {
            release_year: year,
            ..title(Some(TYPE_MOVIE), None)
        }
    }

    // -------------------------------------------------------------------------
    // FILTER
    // -------------------------------------------------------------------------

    #[test]
    fn test_filter_year_boundary() {
        assert!(!is_recent(&with_year(Some(2014)), DEFAULT_MIN_RELEASE_YEAR));
        assert!(is_recent(&with_year(Some(2015)), DEFAULT_MIN_RELEASE_YEAR));
        assert!(is_recent(&with_year(Some(2021)), DEFAULT_MIN_RELEASE_YEAR));
    }

    #[test]
    fn test_filter_null_year_excluded() {
        assert!(!is_recent(&with_year(None), DEFAULT_MIN_RELEASE_YEAR));
    }

    #[test]
    fn test_filter_custom_cutoff() {
        assert!(is_recent(&with_year(Some(2010)), 2000));
        assert!(!is_recent(&with_year(Some(2019)), 2020));
    }

    // -------------------------------------------------------------------------
    // DURATION PARSING
    // -------------------------------------------------------------------------

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer(Some("3 Seasons")), Some(3));
        assert_eq!(first_integer(Some("130 min")), Some(130));
        assert_eq!(first_integer(Some("min")), None);
        assert_eq!(first_integer(None), None);
    }

    #[test]
    fn test_first_integer_overflow_is_null() {
        assert_eq!(first_integer(Some("99999999999 min")), None);
    }

    // -------------------------------------------------------------------------
    // ENRICHMENT
    // -------------------------------------------------------------------------

    #[test]
    fn test_tv_show_season_count() {
        let e = enrich_title(title(Some("TV Show"), Some("3 Seasons")));
        assert_eq!(e.season_count, Some(3));
        assert_eq!(e.minutes, None);
        assert!(!e.is_long_movie);
        assert_eq!(e.content_type.as_deref(), Some("tv show"));
    }

    #[test]
    fn test_long_movie() {
        let e = enrich_title(title(Some("Movie"), Some("130 min")));
        assert_eq!(e.minutes, Some(130));
        assert_eq!(e.season_count, None);
        assert!(e.is_long_movie);
        assert_eq!(e.content_type.as_deref(), Some("movie"));
    }

    #[test]
    fn test_short_movie() {
        let e = enrich_title(title(Some("Movie"), Some("90 min")));
        assert_eq!(e.minutes, Some(90));
        assert!(!e.is_long_movie);
    }

    #[test]
    fn test_long_movie_boundary() {
        assert!(enrich_title(title(Some("Movie"), Some("120 min"))).is_long_movie);
        assert!(!enrich_title(title(Some("Movie"), Some("119 min"))).is_long_movie);
    }

    #[test]
    fn test_movie_without_duration() {
        let e = enrich_title(title(Some("Movie"), None));
        assert_eq!(e.minutes, None);
        assert!(!e.is_long_movie);
    }

    #[test]
    fn test_type_match_is_exact() {
        let e = enrich_title(title(Some("movie"), Some("150 min")));
        assert_eq!(e.minutes, None);
        assert!(!e.is_long_movie);
        assert_eq!(e.content_type.as_deref(), Some("movie"));
    }

    #[test]
    fn test_unknown_type_has_no_counts() {
        let e = enrich_title(title(None, Some("2 Seasons")));
        assert_eq!(e.season_count, None);
        assert_eq!(e.minutes, None);
        assert_eq!(e.content_type, None);
    }

    #[test]
    fn test_rating_lowercased() {
        let e = enrich_title(title(Some("Movie"), None));
        assert_eq!(e.rating_clean.as_deref(), Some("tv-ma"));
    }

    #[test]
    fn test_dq_missing_core() {
        assert!(!enrich_title(title(Some("Movie"), None)).dq_missing_core);

        let mut no_title = title(Some("Movie"), None);
        no_title.title = None;
        assert!(enrich_title(no_title).dq_missing_core);

        let mut no_description = title(Some("Movie"), None);
        no_description.description = None;
        assert!(enrich_title(no_description).dq_missing_core);
    }
}
