use std::path::PathBuf;

use anyhow::Result;
use retail_metrics_core::config::PipelineConfig;
use retail_metrics_core::db::{self, DbPool, Identifier};
use retail_metrics_core::loader::load_table;
use retail_metrics_core::pipeline::{self, run_sales_report};
use retail_metrics_core::seed;
use tempfile::TempDir;

const INPUTS: [&str; 7] = [
    "CREATE TABLE branches (branch_id INTEGER PRIMARY KEY, branch_name TEXT, city TEXT)",
    "CREATE TABLE articles (article_id INTEGER PRIMARY KEY, article_name TEXT, category TEXT, price REAL)",
    "CREATE TABLE sales (transaction_id INTEGER PRIMARY KEY, article_id INTEGER, quantity INTEGER, sale_date TEXT, branch_id INTEGER)",
    "INSERT INTO branches VALUES (1, 'Branch A', 'City X'), (2, 'Branch B', 'City Y')",
    "INSERT INTO articles VALUES (1, 'Article A', 'Category X', 100.0), (2, 'Article B', 'Category Y', 100.0)",
    "INSERT INTO sales VALUES (1, 1, 2, '2023-01-01', 1)",
    "INSERT INTO sales VALUES (2, 2, 3, '2023-01-02', 2)",
];

async fn store_with(statements: &[&str]) -> Result<(TempDir, PathBuf, DbPool)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("retail.db");
    let pool = db::connect_or_create(&path).await?;
    for statement in statements {
        sqlx::query(statement).execute(&pool).await?;
    }
    Ok((dir, path, pool))
}

fn config_for(path: PathBuf) -> PipelineConfig {
    PipelineConfig {
        database_path: path,
        explore: false,
        ..PipelineConfig::default()
    }
}

fn table(name: &str) -> Identifier {
    Identifier::new(name).expect("valid identifier")
}

#[tokio::test]
async fn end_to_end_run_derives_and_persists() -> Result<()> {
    let (_dir, path, pool) = store_with(&INPUTS).await?;

    let run = pipeline::run(&pool, &config_for(path.clone())).await;

    assert!(run.report.failures.is_empty());
    assert_eq!(run.report.sales_rows, 2);
    assert_eq!(run.report.enriched_rows, 2);
    assert_eq!(run.report.sales_detail_rows, Some(2));

    let totals = run.enriched.column("total_amount")?.f64()?;
    assert_eq!(totals.get(0), Some(200.0));
    assert_eq!(totals.get(1), Some(300.0));
    assert_eq!(run.enriched.column("year")?.i32()?.get(0), Some(2023));
    assert_eq!(run.enriched.column("month")?.i32()?.get(1), Some(1));

    let persisted = run.report.persisted.expect("metrics were saved");
    assert_eq!(persisted.sales_by_branch, 2);

    let by_branch = load_table(&path, &table("metrics_sales_by_branch")).await?;
    let ids = by_branch.column("branch_id")?.i64()?;
    let sums = by_branch.column("total_sales")?.f64()?;
    assert_eq!((ids.get(0), sums.get(0)), (Some(1), Some(200.0)));
    assert_eq!((ids.get(1), sums.get(1)), (Some(2), Some(300.0)));

    Ok(())
}

#[tokio::test]
async fn rerun_replaces_persisted_tables() -> Result<()> {
    let (_dir, path, pool) = store_with(&INPUTS).await?;
    let config = config_for(path.clone());

    pipeline::run(&pool, &config).await;
    let second = pipeline::run(&pool, &config).await;

    assert!(second.report.failures.is_empty());
    let detail = load_table(&path, &table("sales_detail")).await?;
    assert_eq!(detail.height(), 2);
    let monthly = load_table(&path, &table("metrics_monthly_revenue")).await?;
    assert_eq!(monthly.height(), 1);
    Ok(())
}

#[tokio::test]
async fn report_queries_read_the_persisted_detail() -> Result<()> {
    let (_dir, path, pool) = store_with(&INPUTS).await?;
    let config = config_for(path);
    pipeline::run(&pool, &config).await;

    let (report, failures) = run_sales_report(&pool, &config.tables).await;

    assert!(failures.is_empty());
    assert_eq!(report.branch_sales.len(), 2);
    assert_eq!(
        report.branch_sales[0].branch_name.as_deref(),
        Some("Branch B")
    );
    assert_eq!(report.branch_sales[0].total_sales, Some(300.0));
    assert_eq!(report.monthly_trend.len(), 1);
    assert_eq!(report.monthly_trend[0].transaction_count, 2);
    Ok(())
}

#[tokio::test]
async fn seeded_store_runs_cleanly() -> Result<()> {
    let (_dir, path, pool) = store_with(&[]).await?;
    seed::run(&pool).await?;
    seed::run(&pool).await?;

    let run = pipeline::run(&pool, &config_for(path)).await;

    assert!(run.report.failures.is_empty());
    assert_eq!(run.report.branches_rows, 3);
    assert_eq!(run.report.articles_rows, 6);
    assert_eq!(run.report.sales_rows, 48);
    assert_eq!(run.metrics.monthly_revenue.height(), 12);
    assert_eq!(run.metrics.sales_by_branch.height(), 3);
    Ok(())
}

#[tokio::test]
async fn missing_sales_table_is_recorded_not_fatal() -> Result<()> {
    let (_dir, path, pool) = store_with(&INPUTS[..2]).await?;

    let run = pipeline::run(&pool, &config_for(path)).await;

    assert!(run.report.failures.contains_stage("load_sales"));
    assert!(!run.report.failures.contains_stage("load_branches"));
    assert_eq!(run.report.sales_rows, 0);
    assert_eq!(run.enriched.height(), 0);
    assert!(run.report.persisted.is_none());
    Ok(())
}

#[tokio::test]
async fn missing_category_skips_only_that_metric() -> Result<()> {
    let (_dir, path, pool) = store_with(&[
        "CREATE TABLE branches (branch_id INTEGER PRIMARY KEY, branch_name TEXT, city TEXT)",
        "CREATE TABLE articles (article_id INTEGER PRIMARY KEY, article_name TEXT, price REAL)",
        INPUTS[2],
        "INSERT INTO articles VALUES (1, 'Article A', 100.0)",
        INPUTS[5],
    ])
    .await?;

    let run = pipeline::run(&pool, &config_for(path)).await;

    assert!(run.report.failures.contains_stage("category_revenue"));
    assert!(!run.report.failures.contains_stage("sales_per_branch"));
    assert_eq!(run.metrics.sales_by_branch.height(), 1);
    assert_eq!(run.metrics.category_revenue.height(), 0);
    assert!(run.report.failures.contains_stage("save_metrics"));
    Ok(())
}
