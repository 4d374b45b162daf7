// =============================================================================
// LOADER - Full overwrite of the fact and genre metrics tables
// =============================================================================
//
// Both tables are dropped, recreated and filled inside one transaction, so a
// failure on either leaves the previous contents of both untouched.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::config::DbConfig;
use crate::record::{EnrichedTitle, GenreCount};

/// Postgres caps a statement at 65535 bind parameters
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Postgres truncates identifiers longer than this
const MAX_IDENTIFIER_LEN: usize = 63;

const FACT_COLUMNS: &[(&str, &str)] = &[
    ("show_id", "TEXT"),
    ("type", "TEXT"),
    ("title", "TEXT"),
    ("director", "TEXT"),
    ("cast_members", "TEXT"),
    ("country", "TEXT"),
    ("date_added", "DATE"),
    ("release_year", "INTEGER"),
    ("rating", "TEXT"),
    ("duration", "TEXT"),
    ("listed_in", "TEXT"),
    ("description", "TEXT"),
];

const METRICS_COLUMNS: &[(&str, &str)] = &[
    ("genre", "TEXT NOT NULL"),
    ("titles_count", "BIGINT NOT NULL"),
];

/// Largest batch that stays under the bind parameter cap for the fact table
pub fn max_batch_size() -> usize {
    MAX_BIND_PARAMS / FACT_COLUMNS.len()
}

/// Destination tables, already validated and quoted
#[derive(Debug, Clone)]
pub struct LoadTarget {
    pub fact_table: String,
    pub metrics_table: String,
    pub batch_size: usize,
}

impl LoadTarget {
    pub fn new(fact_table: &str, metrics_table: &str, batch_size: usize) -> Result<Self> {
        if batch_size == 0 || batch_size > max_batch_size() {
            anyhow::bail!(
                "Invalid batch size {}: must be between 1 and {}",
                batch_size,
                max_batch_size()
            );
        }

        let fact_table = quote_table_name(fact_table)?;
        let metrics_table = quote_table_name(metrics_table)?;
        if fact_table == metrics_table {
            anyhow::bail!("Fact and metrics tables must differ, both are {}", fact_table);
        }

        Ok(Self {
            fact_table,
            metrics_table,
            batch_size,
        })
    }
}

/// Validate `name` or `schema.name` and return it double-quoted.
/// Table names cannot be bound as parameters, so only plain identifiers are
/// accepted.
pub fn quote_table_name(name: &str) -> Result<String> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        anyhow::bail!("Invalid table name '{}': expected name or schema.name", name);
    }

    let mut quoted = Vec::with_capacity(parts.len());
    for part in parts {
        let mut chars = part.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid_start || !valid_rest || part.len() > MAX_IDENTIFIER_LEN {
            anyhow::bail!(
                "Invalid table name '{}': identifiers must match [A-Za-z_][A-Za-z0-9_]{{0,62}}",
                name
            );
        }
        quoted.push(format!("\"{}\"", part));
    }

    Ok(quoted.join("."))
}

fn create_table_sql(table: &str, columns: &[(&str, &str)]) -> String {
    let defs: Vec<String> = columns
        .iter()
        .map(|(name, ty)| format!("{} {}", name, ty))
        .collect();
    format!("CREATE TABLE {} ({})", table, defs.join(", "))
}

fn insert_prefix(table: &str, columns: &[(&str, &str)]) -> String {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    format!("INSERT INTO {} ({}) ", table, names.join(", "))
}

/// Connect to the destination database
pub async fn connect(db: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect_with(db.connect_options())
        .await
        .context("Failed to connect to database")
}

/// Drop and recreate `table`
async fn recreate_table(
    conn: &mut PgConnection,
    table: &str,
    columns: &[(&str, &str)],
) -> Result<()> {
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to drop {}", table))?;

    sqlx::query(&create_table_sql(table, columns))
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to create {}", table))?;

    Ok(())
}

/// Replace the fact table with the cleaned columns of `titles`
async fn replace_fact_table(
    conn: &mut PgConnection,
    target: &LoadTarget,
    titles: &[EnrichedTitle],
) -> Result<u64> {
    recreate_table(conn, &target.fact_table, FACT_COLUMNS).await?;

    let mut inserted = 0;
    for batch in titles.chunks(target.batch_size) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(insert_prefix(&target.fact_table, FACT_COLUMNS));

        qb.push_values(batch, |mut row, enriched| {
            let t = &enriched.title;
            row.push_bind(t.show_id.as_deref())
                .push_bind(t.kind.as_deref())
                .push_bind(t.title.as_deref())
                .push_bind(t.director.as_deref())
                .push_bind(t.cast.as_deref())
                .push_bind(t.country.as_deref())
                .push_bind(t.date_added)
                .push_bind(t.release_year)
                .push_bind(t.rating.as_deref())
                .push_bind(t.duration.as_deref())
                .push_bind(t.listed_in.as_deref())
                .push_bind(t.description.as_deref());
        });

        inserted += qb
            .build()
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Failed to insert batch into {}", target.fact_table))?
            .rows_affected();
    }

    Ok(inserted)
}

/// Replace the genre metrics table, preserving the given order
async fn replace_metrics_table(
    conn: &mut PgConnection,
    target: &LoadTarget,
    genres: &[GenreCount],
) -> Result<u64> {
    recreate_table(conn, &target.metrics_table, METRICS_COLUMNS).await?;

    let mut inserted = 0;
    for batch in genres.chunks(target.batch_size) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(insert_prefix(&target.metrics_table, METRICS_COLUMNS));

        qb.push_values(batch, |mut row, g| {
            row.push_bind(g.genre.as_str()).push_bind(g.titles_count);
        });

        inserted += qb
            .build()
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Failed to insert batch into {}", target.metrics_table))?
            .rows_affected();
    }

    Ok(inserted)
}

/// Overwrite both tables in a single transaction
pub async fn load_all(
    pool: &PgPool,
    target: &LoadTarget,
    titles: &[EnrichedTitle],
    genres: &[GenreCount],
) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin load transaction")?;

    let facts = replace_fact_table(&mut tx, target, titles).await?;
    info!(table = %target.fact_table, rows = facts, "fact table written");

    let metrics = replace_metrics_table(&mut tx, target, genres).await?;
    info!(table = %target.metrics_table, rows = metrics, "genre metrics written");

    tx.commit()
        .await
        .context("Failed to commit load transaction")?;

    Ok(())
}
