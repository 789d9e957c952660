//! Turn a [`RawTable`] into the cleaned book frame.
//!
//! Numeric columns are cast non-strictly, so text that does not parse becomes
//! null. Rows with a null title, author, rating or genre are then dropped.
//! Every other field may be null.

use polars::prelude::*;
use serde::Serialize;

use super::frame::{AUTHOR, BOOKFORMAT, GENRE, PAGES, RATING, REVIEWS, TITLE};
use crate::config::{NOT_NULL_COLUMNS, REQUIRED_COLUMNS};
use crate::error::DataResult;
use crate::parser::RawTable;

/// What happened while loading an upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub raw_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
}

/// Cleaned books plus the load report.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub books: DataFrame,
    pub report: LoadReport,
}

/// Validate the columns, type them and drop incomplete rows.
pub fn clean(raw: &RawTable) -> DataResult<Cleaned> {
    raw.require_columns(&REQUIRED_COLUMNS)?;

    let complete = NOT_NULL_COLUMNS
        .iter()
        .fold(lit(true), |acc, name| acc.and(col(*name).is_not_null()));

    let books = raw
        .frame
        .clone()
        .lazy()
        .select([
            col(TITLE),
            col(AUTHOR),
            col(RATING).cast(DataType::Float64),
            col(GENRE),
            count_column(PAGES, DataType::UInt32),
            count_column(REVIEWS, DataType::UInt64),
            col(BOOKFORMAT),
        ])
        .filter(complete)
        .collect()?;

    let report = LoadReport {
        raw_rows: raw.len(),
        kept_rows: books.height(),
        dropped_rows: raw.len() - books.height(),
        encoding: raw.encoding.clone(),
        delimiter: raw.delimiter,
        headers: raw.headers(),
    };

    Ok(Cleaned { books, report })
}

/// Decimal text to an unsigned count. `"120.0"` becomes 120; negative or
/// out-of-range values become null.
fn count_column(name: &str, dtype: DataType) -> Expr {
    col(name).cast(DataType::Float64).cast(dtype)
}
