//! Conversion between SQLite tables and polars frames.

use polars::prelude::*;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Row, Sqlite, TypeInfo, ValueRef};

use crate::db::Identifier;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Real,
    Text,
    /// No declared affinity; decided by the stored values.
    Untyped,
}

/// Maps a declared column type to its SQLite affinity.
fn affinity(declared: &str) -> ColumnKind {
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
        ColumnKind::Integer
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        ColumnKind::Text
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        ColumnKind::Real
    } else {
        ColumnKind::Untyped
    }
}

/// Widens a column kind so that every observed storage class still fits.
fn widen(kind: ColumnKind, storage: &str) -> ColumnKind {
    match (kind, storage) {
        (ColumnKind::Text, _) => ColumnKind::Text,
        (_, "TEXT") | (_, "BLOB") => ColumnKind::Text,
        (ColumnKind::Untyped, "INTEGER") => ColumnKind::Integer,
        (ColumnKind::Untyped | ColumnKind::Integer, "REAL") => ColumnKind::Real,
        (kind, _) => kind,
    }
}

/// Reads every row of `table` into a frame whose columns follow the
/// declared table schema.
pub async fn read_table(conn: &mut SqliteConnection, table: &Identifier) -> Result<DataFrame> {
    let declared: Vec<(String, String)> =
        sqlx::query_as("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
            .bind(table.as_str())
            .fetch_all(&mut *conn)
            .await?;

    if declared.is_empty() {
        return Err(PipelineError::MissingTable(table.to_string()));
    }

    let select = format!("SELECT * FROM {}", table.quoted());
    let rows = sqlx::query(&select).fetch_all(&mut *conn).await?;

    frame_from_rows(&declared, &rows)
}

fn frame_from_rows(declared: &[(String, String)], rows: &[SqliteRow]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(declared.len());

    for (idx, (name, declared_type)) in declared.iter().enumerate() {
        let mut kind = affinity(declared_type);
        for row in rows {
            let value = row.try_get_raw(idx)?;
            if value.is_null() {
                continue;
            }
            let storage = value.type_info();
            kind = widen(kind, storage.name());
        }

        let series = match kind {
            ColumnKind::Integer => {
                let values = rows
                    .iter()
                    .map(|row| row.try_get_unchecked::<Option<i64>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values)
            }
            ColumnKind::Real => {
                let values = rows
                    .iter()
                    .map(|row| row.try_get_unchecked::<Option<f64>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values)
            }
            ColumnKind::Text | ColumnKind::Untyped => {
                let values = rows
                    .iter()
                    .map(|row| row.try_get_unchecked::<Option<String>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values)
            }
        };
        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}

enum SqlValues {
    Integer(Int64Chunked),
    Real(Float64Chunked),
    Text(StringChunked),
}

struct SqlColumn {
    name: String,
    values: SqlValues,
}

/// Double-quotes a column name taken from a frame, doubling embedded quotes.
///
/// Column names come from the store itself, so any name SQLite accepted is
/// written back unchanged.
fn quote_column(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqlColumn {
    fn from_column(column: &Column) -> Result<Self> {
        let name = quote_column(column.name().as_str());
        let values = match column.dtype() {
            DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => SqlValues::Integer(column.cast(&DataType::Int64)?.i64()?.clone()),
            DataType::Float32 | DataType::Float64 => {
                SqlValues::Real(column.cast(&DataType::Float64)?.f64()?.clone())
            }
            _ => SqlValues::Text(column.cast(&DataType::String)?.str()?.clone()),
        };
        Ok(Self { name, values })
    }

    fn sql_type(&self) -> &'static str {
        match self.values {
            SqlValues::Integer(_) => "INTEGER",
            SqlValues::Real(_) => "REAL",
            SqlValues::Text(_) => "TEXT",
        }
    }

    fn bind<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
        row: usize,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match &self.values {
            SqlValues::Integer(ca) => query.bind(ca.get(row)),
            SqlValues::Real(ca) => query.bind(ca.get(row)),
            SqlValues::Text(ca) => query.bind(ca.get(row).map(str::to_owned)),
        }
    }
}

/// Drops `table` if present and recreates it from `df`, one row per frame row.
///
/// Column types map to SQLite as integers/booleans → INTEGER, floats → REAL,
/// everything else → TEXT. Returns the number of inserted rows.
pub async fn replace_table(
    conn: &mut SqliteConnection,
    table: &Identifier,
    df: &DataFrame,
) -> Result<u64> {
    let columns = df
        .get_columns()
        .iter()
        .map(SqlColumn::from_column)
        .collect::<Result<Vec<_>>>()?;

    let drop = format!("DROP TABLE IF EXISTS {}", table.quoted());
    sqlx::query(&drop).execute(&mut *conn).await?;

    let definitions = columns
        .iter()
        .map(|column| format!("{} {}", column.name, column.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    let create = format!("CREATE TABLE {} ({definitions})", table.quoted());
    sqlx::query(&create).execute(&mut *conn).await?;

    let names = columns
        .iter()
        .map(|column| column.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    let insert = format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        table.quoted()
    );

    let mut written = 0;
    for row in 0..df.height() {
        let mut query = sqlx::query(&insert);
        for column in &columns {
            query = column.bind(query, row);
        }
        written += query.execute(&mut *conn).await?.rows_affected();
    }

    Ok(written)
}
