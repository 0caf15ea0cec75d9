// crates/retail-metrics-core/src/error.rs

use thiserror::Error;

use crate::db::identifier::InvalidIdentifier;
use crate::derive::DeriveError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Identifier(#[from] InvalidIdentifier),

    #[error("Field derivation failed: {0}")]
    Derive(#[from] DeriveError),

    #[error("Store not found: {0}")]
    MissingStore(String),

    #[error("Table '{0}' does not exist in the store")]
    MissingTable(String),

    #[error("Metric '{table}' expected {expected} columns, found {found}")]
    MetricShape {
        table: &'static str,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
