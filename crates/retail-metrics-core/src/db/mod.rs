use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions};
use sqlx::{ConnectOptions, Pool, Sqlite};
use tracing::info;

use crate::error::{PipelineError, Result};

pub mod frame;
pub mod identifier;

pub use identifier::Identifier;

pub type DbPool = Pool<Sqlite>;

/// Connection options that leave the store's journal mode as it is.
fn base_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new().filename(path)
}

fn ensure_store_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::MissingStore(path.display().to_string()))
    }
}

/// Open the long-lived store handle used for queries and metric writes.
///
/// The pool holds a single connection; the job never issues concurrent
/// statements against it.
pub async fn connect(path: &Path) -> Result<DbPool> {
    ensure_store_exists(path)?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(base_options(path))
        .await?;

    info!(store = %path.display(), "Store connection established");
    Ok(pool)
}

/// Like [`connect`], but creates the store file (and its parent directory)
/// when it does not exist yet.
pub async fn connect_or_create(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(base_options(path).create_if_missing(true))
        .await?;

    info!(store = %path.display(), "Store connection established");
    Ok(pool)
}

/// Open a short-lived read-only connection. Callers close it when done.
pub async fn open_read_only(path: &Path) -> Result<SqliteConnection> {
    ensure_store_exists(path)?;
    let conn = base_options(path).read_only(true).connect().await?;
    Ok(conn)
}
