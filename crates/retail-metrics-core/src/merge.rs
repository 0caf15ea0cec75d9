use polars::prelude::*;

use crate::schema::articles;

const ROW_ORDER: &str = "__row_order";

/// Left-joins transactions with the article catalog on `article_id`.
///
/// Every transaction row survives in its original order. Transactions
/// without a catalog match get nulls in the catalog columns; a catalog key
/// that appears more than once fans the matching transaction out into one
/// row per catalog entry.
pub fn merge_sales_with_articles(
    sales: &DataFrame,
    catalog: &DataFrame,
) -> PolarsResult<DataFrame> {
    let merged = sales
        .clone()
        .lazy()
        .with_row_index(ROW_ORDER, None)
        .join(
            catalog.clone().lazy(),
            [col(articles::ARTICLE_ID)],
            [col(articles::ARTICLE_ID)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([ROW_ORDER], SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;

    merged.drop(ROW_ORDER)
}
