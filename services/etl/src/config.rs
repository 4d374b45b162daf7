// =============================================================================
// CONFIG - CLI args, then environment (.env loaded by main), then defaults
// =============================================================================

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::postgres::PgConnectOptions;

use crate::enrich::DEFAULT_MIN_RELEASE_YEAR;
use crate::load::LoadTarget;
use crate::Args;

pub const DEFAULT_CSV_PATH: &str = "data/netflix_titles.csv";
pub const DEFAULT_FACT_TABLE: &str = "netflix_movies";
pub const DEFAULT_METRICS_TABLE: &str = "netflix_genre_metrics";
pub const DEFAULT_BATCH_SIZE: usize = 1000;

const DEFAULT_PG_HOST: &str = "localhost";
const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_PG_DATABASE: &str = "postgres";
const DEFAULT_PG_USER: &str = "postgres";

/// Pipeline settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub csv_path: PathBuf,
    pub min_release_year: i32,
    pub target: LoadTarget,
}

impl Config {
    pub fn from_env(args: &Args) -> Result<Self> {
        Self::from_lookup(args, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(args: &Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let csv_path = match &args.csv {
            Some(path) => path.clone(),
            None => PathBuf::from(
                lookup("CSV_PATH").unwrap_or_else(|| DEFAULT_CSV_PATH.to_string()),
            ),
        };

        let min_release_year = setting(
            args.min_year,
            &lookup,
            "MIN_RELEASE_YEAR",
            DEFAULT_MIN_RELEASE_YEAR,
        )?;
        let batch_size = setting(
            args.batch_size,
            &lookup,
            "LOAD_BATCH_SIZE",
            DEFAULT_BATCH_SIZE,
        )?;
        let fact_table = setting(
            args.fact_table.clone(),
            &lookup,
            "FACT_TABLE",
            DEFAULT_FACT_TABLE.to_string(),
        )?;
        let metrics_table = setting(
            args.metrics_table.clone(),
            &lookup,
            "METRICS_TABLE",
            DEFAULT_METRICS_TABLE.to_string(),
        )?;

        Ok(Self {
            csv_path,
            min_release_year,
            target: LoadTarget::new(&fact_table, &metrics_table, batch_size)?,
        })
    }
}

/// CLI value if given, else the environment variable, else `default`
fn setting<T, F>(arg: Option<T>, lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = arg {
        return Ok(value);
    }
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {} value '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

/// Destination database connection. Only needed when actually loading.
#[derive(Clone)]
pub struct DbConfig {
    options: PgConnectOptions,
}

impl DbConfig {
    /// `DB_URL` wins; otherwise the discrete `PG_*` variables are used and
    /// `PG_PASSWORD` is mandatory.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DB_URL") {
            let options = PgConnectOptions::from_str(&url)
                .context("DB_URL is not a valid Postgres connection string")?;
            return Ok(Self { options });
        }

        let password = lookup("PG_PASSWORD").context(
            "No database credentials: set DB_URL, or PG_PASSWORD (with optional PG_HOST, PG_PORT, PG_DATABASE, PG_USER)",
        )?;
        let host = lookup("PG_HOST").unwrap_or_else(|| DEFAULT_PG_HOST.to_string());
        let port = setting(None, &lookup, "PG_PORT", DEFAULT_PG_PORT)?;
        let database = lookup("PG_DATABASE").unwrap_or_else(|| DEFAULT_PG_DATABASE.to_string());
        let user = lookup("PG_USER").unwrap_or_else(|| DEFAULT_PG_USER.to_string());

        let options = PgConnectOptions::new()
            .host(&host)
            .port(port)
            .database(&database)
            .username(&user)
            .password(&password);

        Ok(Self { options })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        self.options.clone()
    }
}

/// Never prints the password
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.options.get_host())
            .field("port", &self.options.get_port())
            .field("database", &self.options.get_database())
            .field("user", &self.options.get_username())
            .finish()
    }
}
