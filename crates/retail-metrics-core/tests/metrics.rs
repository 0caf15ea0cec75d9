use polars::prelude::*;
use retail_metrics_core::metrics::{
    category_revenue, monthly_revenue, sales_per_branch, top_articles,
};

fn enriched() -> DataFrame {
    df!(
        "branch_id" => &[1i64, 2, 1, 3, 2, 3, 1],
        "article_name" => &["Mug", "Grinder", "Beans", "Mug", "Beans", "Filters", "Mug"],
        "category" => &["Kitchen", "Appliances", "Groceries", "Kitchen", "Groceries", "Groceries", "Kitchen"],
        "quantity" => &[2i64, 1, 4, 3, 6, 10, 1],
        "total_amount" => &[24.0f64, 89.5, 75.6, 36.0, 113.4, 45.0, 12.0],
        "year" => &[2023i32, 2023, 2023, 2023, 2023, 2024, 2024],
        "month" => &[1i32, 1, 2, 2, 3, 1, 1],
    )
    .unwrap()
}

#[test]
fn sales_per_branch_sums_totals() -> PolarsResult<()> {
    let df = df!(
        "branch_id" => &[1i64, 1, 2],
        "total_amount" => &[500.0f64, 1000.0, 1500.0],
    )?;

    let result = sales_per_branch(&df)?;

    let branch = result.column("branch_id")?.i64()?;
    let total = result.column("total_amount")?.f64()?;
    assert_eq!(result.height(), 2);
    assert_eq!((branch.get(0), total.get(0)), (Some(1), Some(1500.0)));
    assert_eq!((branch.get(1), total.get(1)), (Some(2), Some(1500.0)));
    Ok(())
}

#[test]
fn branch_totals_add_up_to_the_grand_total() -> PolarsResult<()> {
    let df = enriched();
    let result = sales_per_branch(&df)?;

    let grand_total: f64 = df.column("total_amount")?.f64()?.sum().unwrap();
    let branch_sum: f64 = result.column("total_amount")?.f64()?.sum().unwrap();
    assert!((grand_total - branch_sum).abs() < 1e-9);
    assert_eq!(result.height(), 3);
    Ok(())
}

#[test]
fn top_articles_are_sorted_by_quantity_descending() -> PolarsResult<()> {
    let df = df!(
        "article_name" => &["A", "B", "A"],
        "quantity" => &[5i64, 10, 15],
    )?;

    let result = top_articles(&df)?;

    let names = result.column("article_name")?.str()?;
    let quantity = result.column("quantity")?.i64()?;
    assert_eq!((names.get(0), quantity.get(0)), (Some("A"), Some(20)));
    assert_eq!((names.get(1), quantity.get(1)), (Some("B"), Some(10)));

    let ranked = top_articles(&enriched())?;
    let sums: Vec<i64> = ranked
        .column("quantity")?
        .i64()?
        .into_iter()
        .flatten()
        .collect();
    assert!(sums.windows(2).all(|pair| pair[0] >= pair[1]));
    Ok(())
}

#[test]
fn monthly_revenue_groups_by_year_and_month() -> PolarsResult<()> {
    let df = df!(
        "year" => &[2023i32, 2023, 2023],
        "month" => &[1i32, 1, 2],
        "total_amount" => &[500.0f64, 1000.0, 1500.0],
    )?;

    let result = monthly_revenue(&df)?;

    let month = result.column("month")?.i32()?;
    let revenue = result.column("total_amount")?.f64()?;
    assert_eq!(result.height(), 2);
    assert_eq!((month.get(0), revenue.get(0)), (Some(1), Some(1500.0)));
    assert_eq!((month.get(1), revenue.get(1)), (Some(2), Some(1500.0)));

    let across_years = monthly_revenue(&enriched())?;
    let years = across_years.column("year")?.i32()?;
    assert_eq!(across_years.height(), 4);
    assert_eq!(years.get(3), Some(2024));
    Ok(())
}

#[test]
fn category_revenue_sums_per_category() -> PolarsResult<()> {
    let df = df!(
        "category" => &["Electronics", "Clothing", "Electronics"],
        "total_amount" => &[500.0f64, 1000.0, 1500.0],
    )?;

    let result = category_revenue(&df)?;

    let category = result.column("category")?.str()?;
    let revenue = result.column("total_amount")?.f64()?;
    assert_eq!(
        (category.get(0), revenue.get(0)),
        (Some("Clothing"), Some(1000.0))
    );
    assert_eq!(
        (category.get(1), revenue.get(1)),
        (Some("Electronics"), Some(2000.0))
    );
    Ok(())
}

#[test]
fn groups_without_priced_sales_report_zero() -> PolarsResult<()> {
    let df = df!(
        "category" => &[Some("Groceries"), None, Some("Groceries")],
        "total_amount" => &[Some(10.0f64), None, Some(5.0)],
    )?;

    let result = category_revenue(&df)?;

    assert_eq!(result.height(), 2);
    let revenue = result.column("total_amount")?.f64()?;
    assert_eq!(revenue.null_count(), 0);
    let values: Vec<f64> = revenue.into_iter().flatten().collect();
    assert!(values.contains(&0.0));
    assert!(values.contains(&15.0));
    Ok(())
}

#[test]
fn missing_derived_columns_are_an_error() {
    let df = df!(
        "branch_id" => &[1i64],
        "quantity" => &[2i64],
    )
    .unwrap();

    assert!(sales_per_branch(&df).is_err());
    assert!(monthly_revenue(&df).is_err());
}
