use comfy_table::{presets::UTF8_FULL, Table};
use polars::prelude::*;
use serde::Serialize;

/// Summary statistics for one column of a loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub nulls: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn profile_frame(df: &DataFrame) -> PolarsResult<Vec<ColumnProfile>> {
    let mut profiles = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let nulls = column.null_count();
        let (min, max, mean) = if is_numeric(column.dtype()) {
            let values = column.cast(&DataType::Float64)?;
            let values = values.f64()?;
            (values.min(), values.max(), values.mean())
        } else {
            (None, None, None)
        };

        profiles.push(ColumnProfile {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
            non_null: column.len() - nulls,
            nulls,
            min,
            max,
            mean,
        });
    }

    Ok(profiles)
}

/// Renders the profile of `df` as a printable table headed by `name`.
pub fn render_profile(name: &str, df: &DataFrame) -> PolarsResult<String> {
    let profiles = profile_frame(df)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "column", "dtype", "non-null", "nulls", "min", "max", "mean",
    ]);
    for profile in &profiles {
        table.add_row(vec![
            profile.name.clone(),
            profile.dtype.clone(),
            profile.non_null.to_string(),
            profile.nulls.to_string(),
            format_stat(profile.min),
            format_stat(profile.max),
            format_stat(profile.mean),
        ]);
    }

    Ok(format!(
        "{name}: {} rows × {} columns\n{table}",
        df.height(),
        df.width()
    ))
}

fn format_stat(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_columns_get_summary_statistics() -> PolarsResult<()> {
        let df = df!(
            "quantity" => [Some(2i64), None, Some(4)],
            "article_name" => ["Laptop", "Mouse", "Desk"],
        )?;

        let profiles = profile_frame(&df)?;

        assert_eq!(profiles.len(), 2);
        let quantity = &profiles[0];
        assert_eq!(quantity.name, "quantity");
        assert_eq!((quantity.non_null, quantity.nulls), (2, 1));
        assert_eq!(quantity.min, Some(2.0));
        assert_eq!(quantity.max, Some(4.0));
        assert_eq!(quantity.mean, Some(3.0));

        let name = &profiles[1];
        assert_eq!(name.nulls, 0);
        assert_eq!(name.mean, None);
        Ok(())
    }

    #[test]
    fn rendered_profile_names_the_table_and_columns() -> PolarsResult<()> {
        let df = df!("price" => [1.5, 2.5])?;

        let rendered = render_profile("Articles", &df)?;

        assert!(rendered.starts_with("Articles: 2 rows × 1 columns"));
        assert!(rendered.contains("price"));
        assert!(rendered.contains("f64"));
        Ok(())
    }
}
