//! The book table shown under the chart.

use polars::prelude::*;
use serde::Serialize;

use super::frame::{floats, page_counts, review_counts, strings, AUTHOR, GENRE, RATING, TITLE};
use crate::config::DISPLAY_COLUMNS;

/// One row of the display table.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    /// Position after sorting, from 0.
    pub index: usize,
    pub title: String,
    pub author: String,
    pub rating: f64,
    pub reviews: Option<u64>,
    pub pages: Option<u32>,
    pub genre: String,
}

/// Filtered books projected to the display columns, best rated first.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    /// Keep at most `limit` rows.
    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Project, sort by rating (descending, stable) and re-index.
pub fn display_table(filtered: &DataFrame) -> PolarsResult<DisplayTable> {
    let sorted = filtered
        .clone()
        .lazy()
        .sort_by_exprs(
            [col(RATING)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .select(DISPLAY_COLUMNS.iter().map(|name| col(*name)).collect::<Vec<_>>())
        .collect()?;

    let title = strings(&sorted, TITLE)?;
    let author = strings(&sorted, AUTHOR)?;
    let rating = floats(&sorted, RATING)?;
    let reviews = review_counts(&sorted)?;
    let pages = page_counts(&sorted)?;
    let genre = strings(&sorted, GENRE)?;

    let rows = (0..sorted.height())
        .filter_map(|index| {
            Some(DisplayRow {
                index,
                title: title.get(index)?.to_string(),
                author: author.get(index)?.to_string(),
                rating: rating.get(index)?,
                reviews: reviews.get(index),
                pages: pages.get(index),
                genre: genre.get(index)?.to_string(),
            })
        })
        .collect();

    Ok(DisplayTable {
        columns: sorted
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect(),
        rows,
    })
}
