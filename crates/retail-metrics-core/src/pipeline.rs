//! Sequences the batch job: load, explore, merge, derive, aggregate, persist.
//!
//! Stages never abort the run. A failing stage is logged, recorded in the
//! returned report, and replaced by a safe fallback (an empty frame, or the
//! previous stage's frame unchanged) so the remaining stages still execute.

use std::fmt::Display;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::{InputTables, PipelineConfig};
use crate::db::DbPool;
use crate::derive;
use crate::explore;
use crate::loader;
use crate::merge;
use crate::metrics::{self, BusinessMetrics};
use crate::outputs::{self, PersistedMetrics};
use crate::queries::{self, SalesReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub stage: &'static str,
    pub error: String,
}

/// Failures collected while running stages leniently.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct StageFailures(Vec<StageFailure>);

impl StageFailures {
    /// Unwraps `result`, or logs and records the error and returns `fallback()`.
    pub fn recover<T, E: Display>(
        &mut self,
        stage: &'static str,
        result: Result<T, E>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                error!(stage, error = %err, "Stage failed; continuing with fallback");
                self.0.push(StageFailure {
                    stage,
                    error: err.to_string(),
                });
                fallback()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageFailure> {
        self.0.iter()
    }

    pub fn contains_stage(&self, stage: &str) -> bool {
        self.0.iter().any(|failure| failure.stage == stage)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub branches_rows: usize,
    pub articles_rows: usize,
    pub sales_rows: usize,
    pub enriched_rows: usize,
    pub sales_detail_rows: Option<u64>,
    pub persisted: Option<PersistedMetrics>,
    pub failures: StageFailures,
}

#[derive(Debug)]
pub struct PipelineRun {
    pub enriched: DataFrame,
    pub metrics: BusinessMetrics,
    pub report: PipelineReport,
}

/// Runs the whole job once against the store in `config`.
///
/// `pool` is the long-lived handle used for writes; the input tables are read
/// through the loader's own short-lived connections.
pub async fn run(pool: &DbPool, config: &PipelineConfig) -> PipelineRun {
    let span = info_span!("pipeline", store = %config.database_path.display());
    run_stages(pool, config).instrument(span).await
}

async fn run_stages(pool: &DbPool, config: &PipelineConfig) -> PipelineRun {
    let mut report = PipelineReport::default();
    let store = config.database_path.as_path();
    let tables = &config.tables;

    let branches = report.failures.recover(
        "load_branches",
        loader::load_table(store, &tables.branches).await,
        DataFrame::default,
    );
    let catalog = report.failures.recover(
        "load_articles",
        loader::load_table(store, &tables.articles).await,
        DataFrame::default,
    );
    let sales = report.failures.recover(
        "load_sales",
        loader::load_table(store, &tables.sales).await,
        DataFrame::default,
    );
    report.branches_rows = branches.height();
    report.articles_rows = catalog.height();
    report.sales_rows = sales.height();

    if config.explore {
        for (name, df) in [("Branches", &branches), ("Articles", &catalog), ("Sales", &sales)] {
            match explore::render_profile(name, df) {
                Ok(profile) => println!("{profile}\n"),
                Err(err) => warn!(table = name, error = %err, "Could not profile table"),
            }
        }
    }

    let merged = report.failures.recover(
        "merge",
        merge::merge_sales_with_articles(&sales, &catalog),
        || sales.clone(),
    );
    let enriched = report.failures.recover(
        "derive",
        derive::add_total_and_date_columns(&merged),
        || merged.clone(),
    );
    report.enriched_rows = enriched.height();

    report.sales_detail_rows = report.failures.recover(
        "persist_sales_detail",
        outputs::persist_sales_detail(pool, &enriched).await.map(Some),
        || None,
    );

    let business = BusinessMetrics {
        sales_by_branch: report.failures.recover(
            "sales_per_branch",
            metrics::sales_per_branch(&enriched),
            DataFrame::default,
        ),
        top_articles: report.failures.recover(
            "top_articles",
            metrics::top_articles(&enriched),
            DataFrame::default,
        ),
        monthly_revenue: report.failures.recover(
            "monthly_revenue",
            metrics::monthly_revenue(&enriched),
            DataFrame::default,
        ),
        category_revenue: report.failures.recover(
            "category_revenue",
            metrics::category_revenue(&enriched),
            DataFrame::default,
        ),
    };

    for (title, df) in [
        ("Branch Sales", &business.sales_by_branch),
        ("Top Articles", &business.top_articles),
        ("Monthly Revenue", &business.monthly_revenue),
        ("Category Revenue", &business.category_revenue),
    ] {
        println!("{title}:\n{df}\n");
        info!("{title}:\n{df}");
    }

    report.persisted = report.failures.recover(
        "save_metrics",
        outputs::save_metrics(pool, &business).await.map(Some),
        || None,
    );

    if report.failures.is_empty() {
        info!(rows = report.enriched_rows, "Pipeline finished");
    } else {
        warn!(
            failed_stages = report.failures.len(),
            "Pipeline finished with failures"
        );
    }

    PipelineRun {
        enriched,
        metrics: business,
        report,
    }
}

/// Runs the five report queries against `sales_detail` and the configured
/// input tables; a failing query contributes no rows.
pub async fn run_sales_report(pool: &DbPool, tables: &InputTables) -> (SalesReport, StageFailures) {
    let mut failures = StageFailures::default();

    let report = SalesReport {
        branch_sales: failures.recover(
            "total_sales_per_branch",
            queries::total_sales_per_branch(pool, tables).await,
            Vec::new,
        ),
        category_revenue: failures.recover(
            "revenue_per_category",
            queries::revenue_per_category(pool, tables).await,
            Vec::new,
        ),
        top_articles: failures.recover(
            "top5_selling_articles",
            queries::top5_selling_articles(pool, tables).await,
            Vec::new,
        ),
        monthly_trend: failures.recover(
            "monthly_sales_trend",
            queries::monthly_sales_trend(pool).await,
            Vec::new,
        ),
        city_performance: failures.recover(
            "sales_performance_by_city",
            queries::sales_performance_by_city(pool, tables).await,
            Vec::new,
        ),
    };

    (report, failures)
}
