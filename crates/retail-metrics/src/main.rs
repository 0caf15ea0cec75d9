use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use retail_metrics_core::config::PipelineConfig;
use retail_metrics_core::queries::SalesReport;
use retail_metrics_core::{db, pipeline, seed};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Retail sales metrics batch job", long_about = None)]
struct Cli {
    /// TOML file with pipeline settings
    #[arg(long, global = true, env = "RETAIL_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite store holding the input tables and receiving the metrics
    #[arg(long, global = true, env = "RETAIL_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// File that receives a copy of every log line
    #[arg(long, global = true, env = "RETAIL_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, enrich, aggregate and persist the sales metrics (default)
    Run(RunArgs),
    /// Print the SQL reports computed from the persisted sales_detail table
    Report,
    /// Create the input tables and fill them with demo data
    DbSeed,
}

impl Default for Command {
    fn default() -> Self {
        Command::Run(RunArgs::default())
    }
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Skip the per-column statistics of the loaded tables
    #[arg(long)]
    skip_explore: bool,

    /// Print the run summary as JSON when finished
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config =
        PipelineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    if let Some(path) = cli.log_file {
        config.log_file = path;
    }

    init_tracing(&config.log_file)?;

    match cli.command.unwrap_or_default() {
        Command::Run(args) => handle_run(config, args).await,
        Command::Report => handle_report(config).await,
        Command::DbSeed => handle_db_seed(config).await,
    }
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

async fn handle_run(mut config: PipelineConfig, args: RunArgs) -> Result<()> {
    if args.skip_explore {
        config.explore = false;
    }

    let pool = db::connect(&config.database_path)
        .await
        .context("failed to open the store")?;

    let run = pipeline::run(&pool, &config).await;
    pool.close().await;

    for failure in run.report.failures.iter() {
        warn!(stage = failure.stage, error = %failure.error, "Stage did not complete");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    }

    Ok(())
}

async fn handle_report(config: PipelineConfig) -> Result<()> {
    let pool = db::connect(&config.database_path)
        .await
        .context("failed to open the store")?;

    let (report, failures) = pipeline::run_sales_report(&pool, &config.tables).await;
    pool.close().await;

    print_report(&report);
    if !failures.is_empty() {
        warn!(
            failed_queries = failures.len(),
            "Some report queries failed"
        );
    }

    Ok(())
}

async fn handle_db_seed(config: PipelineConfig) -> Result<()> {
    let pool = db::connect_or_create(&config.database_path)
        .await
        .context("failed to open or create the store")?;

    seed::run(&pool).await?;
    pool.close().await;

    info!(store = %config.database_path.display(), "Demo data seeded");
    Ok(())
}

fn print_table(title: &str, header: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    for row in rows {
        table.add_row(row);
    }
    println!("{title}:\n{table}\n");
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn money(value: Option<f64>) -> String {
    cell(value.map(|v| format!("{v:.2}")))
}

fn print_report(report: &SalesReport) {
    print_table(
        "Total sales per branch",
        &["branch_name", "total_sales"],
        report
            .branch_sales
            .iter()
            .map(|row| vec![cell(row.branch_name.as_deref()), money(row.total_sales)])
            .collect(),
    );

    print_table(
        "Revenue per category",
        &["category", "total_revenue"],
        report
            .category_revenue
            .iter()
            .map(|row| vec![cell(row.category.as_deref()), money(row.total_revenue)])
            .collect(),
    );

    print_table(
        "Top 5 selling articles",
        &["article_name", "total_quantity"],
        report
            .top_articles
            .iter()
            .map(|row| vec![cell(row.article_name.as_deref()), cell(row.total_quantity)])
            .collect(),
    );

    print_table(
        "Monthly sales trend",
        &["year", "month", "monthly_revenue", "transaction_count"],
        report
            .monthly_trend
            .iter()
            .map(|row| {
                vec![
                    cell(row.year),
                    cell(row.month),
                    money(row.monthly_revenue),
                    row.transaction_count.to_string(),
                ]
            })
            .collect(),
    );

    print_table(
        "Sales performance by city",
        &[
            "city",
            "num_branches",
            "total_revenue",
            "avg_transaction_value",
        ],
        report
            .city_performance
            .iter()
            .map(|row| {
                vec![
                    cell(row.city.as_deref()),
                    row.num_branches.to_string(),
                    money(row.total_revenue),
                    money(row.avg_transaction_value),
                ]
            })
            .collect(),
    );
}
