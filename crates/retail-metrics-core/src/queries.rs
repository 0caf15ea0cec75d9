//! Report queries evaluated by the store against the persisted
//! `sales_detail` table, joined with the configured branch and article
//! tables.

use serde::Serialize;
use sqlx::FromRow;

use crate::config::InputTables;
use crate::db::DbPool;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BranchSales {
    pub branch_name: Option<String>,
    pub total_sales: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CategoryRevenue {
    pub category: Option<String>,
    pub total_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ArticleQuantity {
    pub article_name: Option<String>,
    pub total_quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MonthlyTrend {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub monthly_revenue: Option<f64>,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CityPerformance {
    pub city: Option<String>,
    pub num_branches: i64,
    pub total_revenue: Option<f64>,
    pub avg_transaction_value: Option<f64>,
}

/// Total sales per branch name, highest first.
pub async fn total_sales_per_branch(
    pool: &DbPool,
    tables: &InputTables,
) -> Result<Vec<BranchSales>> {
    let sql = format!(
        r#"
        SELECT b.branch_name, CAST(SUM(s.total_amount) AS REAL) AS total_sales
        FROM sales_detail s
        JOIN {branches} b ON s.branch_id = b.branch_id
        GROUP BY b.branch_name
        ORDER BY total_sales DESC
        "#,
        branches = tables.branches.quoted(),
    );
    let rows = sqlx::query_as::<_, BranchSales>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Revenue per catalog category, highest first.
pub async fn revenue_per_category(
    pool: &DbPool,
    tables: &InputTables,
) -> Result<Vec<CategoryRevenue>> {
    let sql = format!(
        r#"
        SELECT a.category, CAST(SUM(s.total_amount) AS REAL) AS total_revenue
        FROM sales_detail s
        JOIN {articles} a ON s.article_id = a.article_id
        GROUP BY a.category
        ORDER BY total_revenue DESC
        "#,
        articles = tables.articles.quoted(),
    );
    let rows = sqlx::query_as::<_, CategoryRevenue>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// The five articles with the highest quantity sold.
pub async fn top5_selling_articles(
    pool: &DbPool,
    tables: &InputTables,
) -> Result<Vec<ArticleQuantity>> {
    let sql = format!(
        r#"
        SELECT a.article_name, CAST(SUM(s.quantity) AS INTEGER) AS total_quantity
        FROM sales_detail s
        JOIN {articles} a ON s.article_id = a.article_id
        GROUP BY a.article_name
        ORDER BY total_quantity DESC
        LIMIT 5
        "#,
        articles = tables.articles.quoted(),
    );
    let rows = sqlx::query_as::<_, ArticleQuantity>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Revenue and number of transactions per month, in calendar order.
pub async fn monthly_sales_trend(pool: &DbPool) -> Result<Vec<MonthlyTrend>> {
    let rows = sqlx::query_as::<_, MonthlyTrend>(
        r#"
        SELECT
            year,
            month,
            CAST(SUM(total_amount) AS REAL) AS monthly_revenue,
            COUNT(*) AS transaction_count
        FROM sales_detail
        GROUP BY year, month
        ORDER BY year, month
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Branch count, revenue and average transaction value per city, highest
/// revenue first.
pub async fn sales_performance_by_city(
    pool: &DbPool,
    tables: &InputTables,
) -> Result<Vec<CityPerformance>> {
    let sql = format!(
        r#"
        SELECT
            b.city,
            COUNT(DISTINCT b.branch_id) AS num_branches,
            CAST(SUM(s.total_amount) AS REAL) AS total_revenue,
            CAST(AVG(s.total_amount) AS REAL) AS avg_transaction_value
        FROM sales_detail s
        JOIN {branches} b ON s.branch_id = b.branch_id
        GROUP BY b.city
        ORDER BY total_revenue DESC
        "#,
        branches = tables.branches.quoted(),
    );
    let rows = sqlx::query_as::<_, CityPerformance>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Results of all five report queries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalesReport {
    pub branch_sales: Vec<BranchSales>,
    pub category_revenue: Vec<CategoryRevenue>,
    pub top_articles: Vec<ArticleQuantity>,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub city_performance: Vec<CityPerformance>,
}
