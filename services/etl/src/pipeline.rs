// =============================================================================
// PIPELINE - clean -> dedup -> filter -> enrich -> genre metrics
// =============================================================================
//
// Same input + same cutoff = same output. Record order follows file order,
// genre order is fully determined by (count desc, genre asc).

use serde::Serialize;
use tracing::info;

use crate::clean::{clean_title, dedup_by_show_id};
use crate::enrich::{enrich_title, is_recent, TYPE_MOVIE, TYPE_TV_SHOW};
use crate::metrics::genre_metrics;
use crate::reader::ReadOutcome;
use crate::record::{EnrichedTitle, GenreCount};

/// Counters reported at the end of a run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub malformed_rows: usize,
    pub duplicates_dropped: usize,
    pub filtered_out: usize,
    pub titles_kept: usize,
    pub tv_shows: usize,
    pub movies: usize,
    pub long_movies: usize,
    pub missing_core: usize,
    pub distinct_genres: usize,
    pub genre_mentions: i64,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub titles: Vec<EnrichedTitle>,
    pub genres: Vec<GenreCount>,
    pub summary: RunSummary,
}

/// Run every transform stage over the extracted rows
pub fn run_pipeline(input: ReadOutcome, min_release_year: i32) -> PipelineOutput {
    let rows_read = input.titles.len();

    let cleaned = input.titles.into_iter().map(clean_title).collect();
    let (unique, duplicates_dropped) = dedup_by_show_id(cleaned);
    info!(rows_read, duplicates_dropped, "cleaned and de-duplicated");

    let before_filter = unique.len();
    let titles: Vec<EnrichedTitle> = unique
        .into_iter()
        .filter(|t| is_recent(t, min_release_year))
        .map(enrich_title)
        .collect();
    let filtered_out = before_filter - titles.len();
    info!(
        min_release_year,
        kept = titles.len(),
        filtered_out,
        "filtered by release year"
    );

    let genres = genre_metrics(&titles);

    let summary = RunSummary {
        rows_read,
        malformed_rows: input.malformed_rows,
        duplicates_dropped,
        filtered_out,
        titles_kept: titles.len(),
        tv_shows: titles
            .iter()
            .filter(|t| t.title.kind.as_deref() == Some(TYPE_TV_SHOW))
            .count(),
        movies: titles
            .iter()
            .filter(|t| t.title.kind.as_deref() == Some(TYPE_MOVIE))
            .count(),
        long_movies: titles.iter().filter(|t| t.is_long_movie).count(),
        missing_core: titles.iter().filter(|t| t.dq_missing_core).count(),
        distinct_genres: genres.len(),
        genre_mentions: genres.iter().map(|g| g.titles_count).sum(),
    };

    PipelineOutput {
        titles,
        genres,
        summary,
    }
}
