// =============================================================================
// GENRE METRICS - Explode listed_in, count per genre
// =============================================================================

use std::collections::HashMap;

use crate::record::{EnrichedTitle, GenreCount};

/// Trimmed, non-empty genres of a comma separated list
pub fn split_genres(listed_in: Option<&str>) -> impl Iterator<Item = &str> {
    listed_in
        .into_iter()
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
}

/// Count titles per genre, ordered by count descending then genre ascending
pub fn genre_metrics(titles: &[EnrichedTitle]) -> Vec<GenreCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();

    for title in titles {
        for genre in split_genres(title.title.listed_in.as_deref()) {
            *counts.entry(genre).or_insert(0) += 1;
        }
    }

    let mut metrics: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, titles_count)| GenreCount {
            genre: genre.to_string(),
            titles_count,
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.titles_count
            .cmp(&a.titles_count)
            .then_with(|| a.genre.cmp(&b.genre))
    });

    metrics
}
