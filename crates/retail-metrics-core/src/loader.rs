use std::path::Path;

use polars::prelude::DataFrame;
use sqlx::Connection;
use tracing::info;

use crate::db::{self, frame, Identifier};
use crate::error::Result;

/// Loads one table from the store at `store` into a frame.
///
/// A dedicated read-only connection is opened for the call and closed
/// before returning, independent of any long-lived pool.
pub async fn load_table(store: &Path, table: &Identifier) -> Result<DataFrame> {
    info!(table = %table, "Loading table from store");

    let mut conn = db::open_read_only(store).await?;
    let loaded = frame::read_table(&mut conn, table).await;
    conn.close().await?;

    let df = loaded?;
    info!(table = %table, rows = df.height(), "Loaded table");
    Ok(df)
}
