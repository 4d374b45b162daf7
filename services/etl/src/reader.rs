// =============================================================================
// READER - Permissive CSV extraction
// =============================================================================
//
// The input has a fixed 12-column layout with a header row. Rows are mapped
// by position and never rejected:
// - short rows are padded with nulls
// - extra trailing fields are ignored
// - fields that are not valid UTF-8 become null
// - records the tokenizer rejects become fully null rows
// Only I/O failures abort the read.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::record::{RawTitle, INPUT_COLUMNS};

/// How many individual malformed rows get their own warning line
const MAX_ROW_WARNINGS: usize = 5;

#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub titles: Vec<RawTitle>,
    pub malformed_rows: usize,
}

/// Read and parse the CSV file at `path`
pub async fn read_titles_file(path: &Path) -> Result<ReadOutcome> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read CSV file {}", path.display()))?;
    info!(path = %path.display(), bytes = content.len(), "read input file");

    read_titles(content.as_slice())
}

/// Parse CSV content into raw titles
pub fn read_titles<R: Read>(source: R) -> Result<ReadOutcome> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader
        .byte_headers()
        .context("Failed to read CSV headers")?
        .clone();
    check_headers(&headers);

    let mut outcome = ReadOutcome::default();
    let mut record = csv::ByteRecord::new();
    let mut row = 0;

    loop {
        row += 1;
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                if record.len() != INPUT_COLUMNS.len() {
                    outcome.malformed_rows += 1;
                    if outcome.malformed_rows <= MAX_ROW_WARNINGS {
                        warn!(
                            row,
                            fields = record.len(),
                            expected = INPUT_COLUMNS.len(),
                            "unexpected field count, row kept permissively"
                        );
                    }
                }
                outcome.titles.push(RawTitle::from_fields(
                    record.iter().map(decode_field),
                ));
            }
            Err(e) if e.is_io_error() => {
                return Err(e).context("I/O error while reading CSV");
            }
            Err(e) => {
                outcome.malformed_rows += 1;
                if outcome.malformed_rows <= MAX_ROW_WARNINGS {
                    warn!(row, error = %e, "malformed CSV record, kept as null row");
                }
                outcome.titles.push(RawTitle::default());
            }
        }
    }

    if outcome.malformed_rows > MAX_ROW_WARNINGS {
        warn!(
            total = outcome.malformed_rows,
            "more malformed rows than shown above"
        );
    }

    Ok(outcome)
}

/// Invalid UTF-8 yields null rather than an error
fn decode_field(field: &[u8]) -> Option<String> {
    std::str::from_utf8(field).ok().map(str::to_string)
}

/// Headers are not used for mapping; a mismatch is only reported
fn check_headers(headers: &csv::ByteRecord) {
    let found: Vec<String> = headers
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_lowercase()
        })
        .collect();

    let matches = found.len() == INPUT_COLUMNS.len()
        && found.iter().zip(INPUT_COLUMNS.iter()).all(|(f, e)| f == e);

    if !matches {
        warn!(
            expected = ?INPUT_COLUMNS,
            found = ?found,
            "CSV header differs from expected layout, mapping columns by position"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description\n";

    fn read(body: &str) -> ReadOutcome {
        let csv = format!("{}{}", HEADER, body);
        read_titles(csv.as_bytes()).unwrap()
    }

    // -------------------------------------------------------------------------
    // POSITIONAL MAPPING
    // -------------------------------------------------------------------------

    #[test]
    fn test_full_row_maps_by_position() {
        let out = read("s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,\"September 25, 2021\",2020,PG-13,90 min,Documentaries,\"As her father nears the end of his life...\"\n");

        assert_eq!(out.titles.len(), 1);
        assert_eq!(out.malformed_rows, 0);
        let t = &out.titles[0];
        assert_eq!(t.show_id.as_deref(), Some("s1"));
        assert_eq!(t.kind.as_deref(), Some("Movie"));
        assert_eq!(t.title.as_deref(), Some("Dick Johnson Is Dead"));
        assert_eq!(t.cast.as_deref(), Some(""));
        assert_eq!(t.date_added.as_deref(), Some("September 25, 2021"));
        assert_eq!(t.release_year.as_deref(), Some("2020"));
        assert_eq!(t.listed_in.as_deref(), Some("Documentaries"));
        assert_eq!(
            t.description.as_deref(),
            Some("As her father nears the end of his life...")
        );
    }

    #[test]
    fn test_quoted_commas_stay_in_field() {
        let out = read("s2,TV Show,Blood & Water,,\"Ama Qamata, Khosi Ngema\",South Africa,\"September 24, 2021\",2021,TV-MA,2 Seasons,\"International TV Shows, TV Dramas, TV Mysteries\",desc\n");

        let t = &out.titles[0];
        assert_eq!(t.cast.as_deref(), Some("Ama Qamata, Khosi Ngema"));
        assert_eq!(
            t.listed_in.as_deref(),
            Some("International TV Shows, TV Dramas, TV Mysteries")
        );
    }

    #[test]
    fn test_header_mismatch_is_not_fatal() {
        let csv = "a,b,c\ns1,Movie,Title\n";
        let out = read_titles(csv.as_bytes()).unwrap();
        assert_eq!(out.titles.len(), 1);
        assert_eq!(out.titles[0].title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_header_with_bom() {
        let csv = format!("\u{feff}{}s1,Movie,T,,,,,2020,,,,\n", HEADER);
        let out = read_titles(csv.as_bytes()).unwrap();
        assert_eq!(out.titles.len(), 1);
        assert_eq!(out.malformed_rows, 0);
    }

    // -------------------------------------------------------------------------
    // PERMISSIVE MODE
    // -------------------------------------------------------------------------

    #[test]
    fn test_short_row_padded_with_nulls() {
        let out = read("s1,Movie,Short\n");

        assert_eq!(out.titles.len(), 1);
        assert_eq!(out.malformed_rows, 1);
        let t = &out.titles[0];
        assert_eq!(t.title.as_deref(), Some("Short"));
        assert_eq!(t.director, None);
        assert_eq!(t.description, None);
    }

    #[test]
    fn test_long_row_extra_fields_ignored() {
        let out = read("s1,Movie,T,d,c,co,da,2020,r,90 min,g,desc,EXTRA,MORE\n");

        assert_eq!(out.titles.len(), 1);
        assert_eq!(out.malformed_rows, 1);
        assert_eq!(out.titles[0].description.as_deref(), Some("desc"));
    }

    #[test]
    fn test_invalid_utf8_field_becomes_null() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"s1,Movie,\xff\xfe,,,,,2020,,,,\n");

        let out = read_titles(bytes.as_slice()).unwrap();
        assert_eq!(out.titles.len(), 1);
        assert_eq!(out.titles[0].title, None);
        assert_eq!(out.titles[0].show_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_mixed_good_and_bad_rows_all_kept() {
        let out = read("s1,Movie,A,,,,,2020,,,,\ns2\ns3,Movie,C,,,,,2021,,,,\n");

        assert_eq!(out.titles.len(), 3);
        assert_eq!(out.malformed_rows, 1);
        assert_eq!(out.titles[1].show_id.as_deref(), Some("s2"));
        assert_eq!(out.titles[2].title.as_deref(), Some("C"));
    }

    #[test]
    fn test_header_only() {
        let out = read("");
        assert!(out.titles.is_empty());
        assert_eq!(out.malformed_rows, 0);
    }
}
