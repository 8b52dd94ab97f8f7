// ⚠️ Error taxonomy for the ETL pipeline
// Every failure aborts the run; the progress log records how far it got.

use thiserror::Error;

/// Failures while locating or reading the source table
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no table with class '{marker}' found in document")]
    NoMatchingTable { marker: String },

    #[error("column '{column}' not found in table header")]
    MissingColumn { column: String },

    #[error("row {row}: market cap '{value}' is not numeric")]
    NonNumericCell { row: usize, value: String },

    #[error("row {row}: expected at least {expected} cells, found {found}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Failures while loading the exchange rate table
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("exchange rate for '{currency}' is missing")]
    MissingRate { currency: String },

    #[error("cannot read exchange rates from {path}: {source}")]
    InvalidRates {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("query failed: {sql}: {source}")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to persist dataset to {target}: {message}")]
    Persist { target: String, message: String },

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write progress log {path}: {source}")]
    Log {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl EtlError {
    pub(crate) fn persist(target: impl Into<String>, err: impl std::fmt::Display) -> Self {
        EtlError::Persist {
            target: target.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
