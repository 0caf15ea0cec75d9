use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::db::{frame, DbPool, Identifier};
use crate::error::{PipelineError, Result};
use crate::metrics::BusinessMetrics;
use crate::schema::{metrics, sales_detail};

/// Rows written per metric table by [`save_metrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistedMetrics {
    pub sales_by_branch: u64,
    pub top_articles: u64,
    pub monthly_revenue: u64,
    pub category_revenue: u64,
}

/// Renames a metric frame positionally to its canonical column names.
fn canonical(df: &DataFrame, table: &'static str, columns: &[&str]) -> Result<DataFrame> {
    if df.width() != columns.len() {
        return Err(PipelineError::MetricShape {
            table,
            expected: columns.len(),
            found: df.width(),
        });
    }

    let mut renamed = df.clone();
    renamed.set_column_names(columns.iter().copied())?;
    Ok(renamed)
}

/// Writes the four metrics as `metrics_*` tables, replacing earlier versions.
///
/// All writes share one transaction: either every table is replaced and
/// committed, or none is and the previous tables stay as they were.
pub async fn save_metrics(pool: &DbPool, business: &BusinessMetrics) -> Result<PersistedMetrics> {
    let targets = [
        (
            metrics::SALES_BY_BRANCH,
            &metrics::SALES_BY_BRANCH_COLUMNS[..],
            &business.sales_by_branch,
        ),
        (
            metrics::TOP_ARTICLES,
            &metrics::TOP_ARTICLES_COLUMNS[..],
            &business.top_articles,
        ),
        (
            metrics::MONTHLY_REVENUE,
            &metrics::MONTHLY_REVENUE_COLUMNS[..],
            &business.monthly_revenue,
        ),
        (
            metrics::CATEGORY_REVENUE,
            &metrics::CATEGORY_REVENUE_COLUMNS[..],
            &business.category_revenue,
        ),
    ];

    let mut written = [0u64; 4];
    let mut tx = pool.begin().await?;
    for (slot, (table, columns, df)) in written.iter_mut().zip(targets) {
        let renamed = canonical(df, table, columns)?;
        *slot = frame::replace_table(&mut tx, &Identifier::from_static(table), &renamed).await?;
        info!(table, rows = *slot, "Wrote metric table");
    }
    tx.commit().await?;

    info!("All business metrics saved to the store");
    let [sales_by_branch, top_articles, monthly_revenue, category_revenue] = written;
    Ok(PersistedMetrics {
        sales_by_branch,
        top_articles,
        monthly_revenue,
        category_revenue,
    })
}

/// Persists the enriched transactions as `sales_detail`, the table read by
/// the report queries.
pub async fn persist_sales_detail(pool: &DbPool, enriched: &DataFrame) -> Result<u64> {
    let table = Identifier::from_static(sales_detail::TABLE);
    let mut tx = pool.begin().await?;
    let written = frame::replace_table(&mut tx, &table, enriched).await?;
    tx.commit().await?;

    info!(table = %table, rows = written, "Wrote enriched transactions");
    Ok(written)
}
