use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;

use crate::schema::{articles, derived, sales};

const DATE_FORMATS: [&str; 1] = ["%Y-%m-%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("missing column: {0}")]
    MissingColumn(&'static str),
    #[error("column {column} has non-numeric type {dtype}")]
    NonNumeric { column: &'static str, dtype: String },
    #[error("unparseable sale date '{value}' at row {row}")]
    MalformedDate { row: usize, value: String },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Appends `total_amount` (quantity × price), `year` and `month` to a merged
/// sales frame.
///
/// A row with a null quantity or price gets a null total; a row with a null
/// date gets null year and month. Existing derived columns are replaced.
pub fn add_total_and_date_columns(df: &DataFrame) -> Result<DataFrame, DeriveError> {
    let quantity = numeric_column(df, sales::QUANTITY)?;
    let price = numeric_column(df, articles::PRICE)?;
    let dates = df
        .column(sales::SALE_DATE)
        .map_err(|_| DeriveError::MissingColumn(sales::SALE_DATE))?
        .cast(&DataType::String)?;
    let dates = dates.str()?;

    let len = df.height();
    let mut totals: Vec<Option<f64>> = Vec::with_capacity(len);
    let mut years: Vec<Option<i32>> = Vec::with_capacity(len);
    let mut months: Vec<Option<i32>> = Vec::with_capacity(len);

    for idx in 0..len {
        let total = match (quantity.get(idx), price.get(idx)) {
            (Some(quantity), Some(price)) => Some(quantity * price),
            _ => None,
        };
        totals.push(total);

        match dates.get(idx) {
            Some(raw) => {
                let date = parse_sale_date(raw).ok_or_else(|| DeriveError::MalformedDate {
                    row: idx,
                    value: raw.to_string(),
                })?;
                years.push(Some(date.year()));
                months.push(Some(date.month() as i32));
            }
            None => {
                years.push(None);
                months.push(None);
            }
        }
    }

    let mut output = df.clone();
    output.with_column(Series::new(derived::TOTAL_AMOUNT.into(), totals))?;
    output.with_column(Series::new(derived::YEAR.into(), years))?;
    output.with_column(Series::new(derived::MONTH.into(), months))?;

    Ok(output)
}

fn numeric_column(df: &DataFrame, name: &'static str) -> Result<Float64Chunked, DeriveError> {
    let column = df
        .column(name)
        .map_err(|_| DeriveError::MissingColumn(name))?;

    match column.dtype() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => Ok(column.cast(&DataType::Float64)?.f64()?.clone()),
        other => Err(DeriveError::NonNumeric {
            column: name,
            dtype: other.to_string(),
        }),
    }
}

/// Parses the calendar date of a sale from a date, datetime or RFC 3339 string.
pub fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.date_naive())
}

#[cfg(test)]
mod tests {
    use super::parse_sale_date;
    use chrono::NaiveDate;

    #[test]
    fn accepts_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15);
        assert_eq!(parse_sale_date("2023-01-15"), expected);
        assert_eq!(parse_sale_date(" 2023-01-15 "), expected);
        assert_eq!(parse_sale_date("2023-01-15 08:30:00"), expected);
        assert_eq!(parse_sale_date("2023-01-15T08:30:00.250"), expected);
        assert_eq!(parse_sale_date("2023-01-15T08:30:00+02:00"), expected);
    }

    #[test]
    fn rejects_other_shapes() {
        assert_eq!(parse_sale_date("15/01/2023"), None);
        assert_eq!(parse_sale_date("2023-13-01"), None);
        assert_eq!(parse_sale_date(""), None);
    }
}
