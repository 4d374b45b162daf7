//! ETL Service - Loads the streaming titles catalog into Postgres
//!
//! Responsibilities:
//! - Read the titles CSV permissively (bad rows become nulls, never abort)
//! - Clean and type fields, de-duplicate by show_id
//! - Keep titles released in or after the cutoff year and derive attributes
//! - Overwrite the fact table and the genre metrics table in one transaction
//!
//! Usage:
//!   # Full run (DB_URL or PG_* vars from env / .env):
//!   cargo run --bin etl -- --csv data/netflix_titles.csv
//!
//!   # Transform only, print the run summary as JSON:
//!   cargo run --bin etl -- --dry-run --json

mod clean;
mod config;
mod enrich;
mod load;
mod logging;
mod metrics;
mod pipeline;
mod reader;
mod record;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::config::{Config, DbConfig};
use crate::pipeline::{run_pipeline, RunSummary};

/// Genres shown in the end-of-run log
const TOP_GENRES_SHOWN: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "etl", about = "Cleans the titles CSV and loads it into Postgres")]
pub struct Args {
    /// Input CSV path (env: CSV_PATH)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Keep titles released in or after this year (env: MIN_RELEASE_YEAR)
    #[arg(long)]
    min_year: Option<i32>,

    /// Rows per INSERT statement (env: LOAD_BATCH_SIZE)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Destination fact table (env: FACT_TABLE)
    #[arg(long)]
    fact_table: Option<String>,

    /// Destination genre metrics table (env: METRICS_TABLE)
    #[arg(long)]
    metrics_table: Option<String>,

    /// Dry run - transform only, don't touch the database
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long, default_value = "false")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    logging::init_tracing("etl=info")?;

    let config = Config::from_env(&args)?;
    let span = tracing::info_span!("etl_run", run_id = %Uuid::new_v4());

    let summary = run(&config, args.dry_run).instrument(span).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to encode run summary")?;
        println!("{}", json);
    }

    Ok(())
}

async fn run(config: &Config, dry_run: bool) -> Result<RunSummary> {
    info!(
        csv = %config.csv_path.display(),
        min_release_year = config.min_release_year,
        mode = if dry_run { "dry-run" } else { "live" },
        "starting ETL run"
    );

    let input = reader::read_titles_file(&config.csv_path).await?;
    let output = run_pipeline(input, config.min_release_year);

    for (i, genre) in output.genres.iter().take(TOP_GENRES_SHOWN).enumerate() {
        info!(rank = i + 1, genre = %genre.genre, titles = genre.titles_count, "top genre");
    }

    let summary = output.summary;
    info!(
        rows_read = summary.rows_read,
        malformed_rows = summary.malformed_rows,
        duplicates_dropped = summary.duplicates_dropped,
        filtered_out = summary.filtered_out,
        titles_kept = summary.titles_kept,
        tv_shows = summary.tv_shows,
        movies = summary.movies,
        long_movies = summary.long_movies,
        missing_core = summary.missing_core,
        distinct_genres = summary.distinct_genres,
        "transform finished"
    );

    if dry_run {
        info!("Dry run - nothing written to the database");
        return Ok(summary);
    }

    let db = DbConfig::from_env()?;
    info!(db = ?db, "connecting to database");
    let pool = load::connect(&db).await?;

    load::load_all(&pool, &config.target, &output.titles, &output.genres).await?;
    pool.close().await;

    info!(
        "ETL complete: loaded {} and {}",
        config.target.fact_table, config.target.metrics_table
    );

    Ok(summary)
}
