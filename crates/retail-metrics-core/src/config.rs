use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::db::Identifier;
use crate::error::Result;
use crate::schema::{articles, branches, sales};

/// Settings for one pipeline run.
///
/// Every field has a default, so an empty (or absent) config file yields
/// the stock layout: `data/retail_sales.db` with `branches`, `articles` and
/// `sales` tables, logging to `main.log`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Print per-column statistics for each loaded table.
    #[serde(default = "default_explore")]
    pub explore: bool,

    #[serde(default)]
    pub tables: InputTables,
}

/// Names of the tables the pipeline reads.
#[derive(Debug, Clone, Deserialize)]
pub struct InputTables {
    #[serde(default = "default_branches_table")]
    pub branches: Identifier,
    #[serde(default = "default_articles_table")]
    pub articles: Identifier,
    #[serde(default = "default_sales_table")]
    pub sales: Identifier,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/retail_sales.db")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("main.log")
}

fn default_explore() -> bool {
    true
}

fn default_branches_table() -> Identifier {
    Identifier::from_static(branches::TABLE)
}

fn default_articles_table() -> Identifier {
    Identifier::from_static(articles::TABLE)
}

fn default_sales_table() -> Identifier {
    Identifier::from_static(sales::TABLE)
}

impl Default for InputTables {
    fn default() -> Self {
        Self {
            branches: default_branches_table(),
            articles: default_articles_table(),
            sales: default_sales_table(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_file: default_log_file(),
            explore: default_explore(),
            tables: InputTables::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads a TOML config file, or returns the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Self::from_toml_str(&contents)
            }
            None => Ok(Self::default()),
        }
    }
}
