//! In-memory business metrics over the enriched sales frame.
//!
//! Each metric is a group-by-and-sum. Groups whose summed values are all
//! null (e.g. sales of an article missing from the catalog) are kept and
//! report `0.0` rather than disappearing.

use polars::prelude::*;

use crate::schema::{articles, derived, sales};

/// The four metrics produced by one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct BusinessMetrics {
    pub sales_by_branch: DataFrame,
    pub top_articles: DataFrame,
    pub monthly_revenue: DataFrame,
    pub category_revenue: DataFrame,
}

fn summed_total() -> Expr {
    col(derived::TOTAL_AMOUNT)
        .cast(DataType::Float64)
        .sum()
        .fill_null(lit(0.0))
}

/// Total sales amount per branch, ordered by `branch_id`.
pub fn sales_per_branch(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .group_by([col(sales::BRANCH_ID)])
        .agg([summed_total()])
        .sort([sales::BRANCH_ID], SortMultipleOptions::default())
        .collect()
}

/// Quantity sold per article name, largest first.
pub fn top_articles(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .group_by([col(articles::ARTICLE_NAME)])
        .agg([col(sales::QUANTITY).sum()])
        .sort(
            [sales::QUANTITY],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true),
        )
        .collect()
}

/// Revenue per calendar month, ordered by year then month.
pub fn monthly_revenue(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .group_by([col(derived::YEAR), col(derived::MONTH)])
        .agg([summed_total()])
        .sort([derived::YEAR, derived::MONTH], SortMultipleOptions::default())
        .collect()
}

/// Revenue per product category, ordered by category.
pub fn category_revenue(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .group_by([col(articles::CATEGORY)])
        .agg([summed_total()])
        .sort([articles::CATEGORY], SortMultipleOptions::default())
        .collect()
}
