//! Aggregation primitives behind the chart views.
//!
//! Counts and means run as polars group-bys over the cleaned frame; nothing
//! is cached between calls. Tag splitting stays in plain Rust because the
//! two split flavours must not drift apart.

use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::frame::{strings, GENRE, VALUE};

// =============================================================================
// Genre tags
// =============================================================================

/// Split a genre field on commas, keeping surrounding whitespace.
///
/// `"Fantasy, Adventure"` yields `"Fantasy"` and `" Adventure"`, and a
/// trailing comma yields an empty tag. Used by the genre universe and the
/// genre-by-rating ranking.
pub fn split_tags_raw(genre: &str) -> impl Iterator<Item = &str> {
    genre.split(',')
}

/// Split a genre field on commas and trim each tag.
///
/// Used by the genre-by-count ranking only.
pub fn split_tags_trimmed(genre: &str) -> impl Iterator<Item = &str> {
    genre.split(',').map(str::trim)
}

/// Sorted, deduplicated raw tags across all books.
pub fn genre_universe(books: &DataFrame) -> PolarsResult<Vec<String>> {
    Ok(strings(books, GENRE)?
        .into_iter()
        .flatten()
        .flat_map(split_tags_raw)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect())
}

/// Occurrences of each trimmed tag, as a one-column frame named `genre`.
pub fn trimmed_tags(books: &DataFrame) -> PolarsResult<DataFrame> {
    let tags: Vec<&str> = strings(books, GENRE)?
        .into_iter()
        .flatten()
        .flat_map(split_tags_trimmed)
        .collect();
    DataFrame::new(vec![Column::new(GENRE.into(), tags)])
}

// =============================================================================
// Group-bys
// =============================================================================

/// Occurrence count per non-null key, most frequent first.
///
/// Keys with equal counts keep first-seen order.
pub fn value_counts(rows: LazyFrame, key: &str) -> PolarsResult<Vec<(String, f64)>> {
    let counts = rows
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([len().cast(DataType::Float64).alias(VALUE)])
        .sort_by_exprs(
            [col(VALUE)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;
    labelled(&counts, key)
}

/// Mean of `value` per key, highest mean first; equal means stay
/// alphabetical.
pub fn group_mean(rows: LazyFrame, key: &str, value: &str) -> PolarsResult<Vec<(String, f64)>> {
    let means = rows
        .group_by([col(key)])
        .agg([col(value).mean().alias(VALUE)])
        .sort_by_exprs(
            [col(VALUE), col(key)],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    labelled(&means, key)
}

fn labelled(df: &DataFrame, key: &str) -> PolarsResult<Vec<(String, f64)>> {
    let labels = strings(df, key)?;
    let values = df.column(VALUE)?.as_materialized_series().f64()?;
    Ok(labels
        .into_iter()
        .zip(values)
        .filter_map(|(label, value)| Some((label?.to_string(), value?)))
        .collect())
}

// =============================================================================
// Ordering helpers
// =============================================================================

/// Stable descending sort by an optional metric; `None` sorts last.
pub fn sort_desc_by_metric<T>(items: &mut [T], metric: impl Fn(&T) -> Option<f64>) {
    items.sort_by(|a, b| match (metric(a), metric(b)) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// First `n` entries.
pub fn top_n<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    items.truncate(n);
    items
}

// =============================================================================
// Histogram
// =============================================================================

/// One histogram bucket `[start, end)`; the last bucket is closed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram spanning the observed min and max.
///
/// All-equal input collapses to a single bin. Empty input yields no bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let slot = (((v - min) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: if i + 1 == bins { max } else { min + (i + 1) as f64 * width },
            count,
        })
        .collect()
}
