//! Record types flowing through the pipeline
//!
//! RawTitle -> CleanTitle -> EnrichedTitle, plus the GenreCount aggregate.

use chrono::NaiveDate;

/// Input columns in file order. Rows are mapped by position, these names
/// are only used to sanity-check the header.
pub const INPUT_COLUMNS: [&str; 12] = [
    "show_id",
    "type",
    "title",
    "director",
    "cast",
    "country",
    "date_added",
    "release_year",
    "rating",
    "duration",
    "listed_in",
    "description",
];

/// One input row, every field still free text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTitle {
    pub show_id: Option<String>,
    pub kind: Option<String>,
    pub title: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub release_year: Option<String>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
}

impl RawTitle {
    /// Build from positional fields. Missing trailing fields stay null,
    /// extra fields are ignored.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut it = fields.into_iter();
        let mut next = || it.next().flatten();

        Self {
            show_id: next(),
            kind: next(),
            title: next(),
            director: next(),
            cast: next(),
            country: next(),
            date_added: next(),
            release_year: next(),
            rating: next(),
            duration: next(),
            listed_in: next(),
            description: next(),
        }
    }

    /// Apply `f` to every field, in column order
    pub fn map_fields<F>(self, mut f: F) -> Self
    where
        F: FnMut(Option<String>) -> Option<String>,
    {
        Self {
            show_id: f(self.show_id),
            kind: f(self.kind),
            title: f(self.title),
            director: f(self.director),
            cast: f(self.cast),
            country: f(self.country),
            date_added: f(self.date_added),
            release_year: f(self.release_year),
            rating: f(self.rating),
            duration: f(self.duration),
            listed_in: f(self.listed_in),
            description: f(self.description),
        }
    }
}

/// A row after trimming, null normalization and type parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanTitle {
    pub show_id: Option<String>,
    pub kind: Option<String>,
    pub title: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
}

/// A cleaned row plus derived business attributes (never persisted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedTitle {
    pub title: CleanTitle,
    pub content_type: Option<String>,
    pub rating_clean: Option<String>,
    pub season_count: Option<i32>,
    pub minutes: Option<i32>,
    pub is_long_movie: bool,
    pub dq_missing_core: bool,
}

/// Row of the genre metrics table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub titles_count: i64,
}
