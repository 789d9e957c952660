//! Column names and conversions between the cleaned [`DataFrame`] and
//! row-shaped [`BookRecord`]s.
//!
//! The cleaned frame always has these columns, in this order:
//!
//! | Column       | Type            | Nulls |
//! |--------------|-----------------|-------|
//! | `title`      | `String`        | no    |
//! | `author`     | `String`        | no    |
//! | `rating`     | `Float64`       | no    |
//! | `genre`      | `String`        | no    |
//! | `pages`      | `UInt32`        | yes   |
//! | `reviews`    | `UInt64`        | yes   |
//! | `bookformat` | `String`        | yes   |

use polars::prelude::*;

use crate::models::{BookRecord, PagesBounds};

pub const TITLE: &str = "title";
pub const AUTHOR: &str = "author";
pub const RATING: &str = "rating";
pub const GENRE: &str = "genre";
pub const PAGES: &str = "pages";
pub const REVIEWS: &str = "reviews";
pub const BOOKFORMAT: &str = "bookformat";

/// Alias of computed count and mean columns.
pub const VALUE: &str = "value";

pub(crate) fn strings<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<&'a StringChunked> {
    df.column(name)?.as_materialized_series().str()
}

pub(crate) fn floats<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<&'a Float64Chunked> {
    df.column(name)?.as_materialized_series().f64()
}

pub(crate) fn page_counts(df: &DataFrame) -> PolarsResult<&UInt32Chunked> {
    df.column(PAGES)?.as_materialized_series().u32()
}

pub(crate) fn review_counts(df: &DataFrame) -> PolarsResult<&UInt64Chunked> {
    df.column(REVIEWS)?.as_materialized_series().u64()
}

/// Build a cleaned-shape frame from records.
pub fn to_frame(books: &[BookRecord]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(TITLE.into(), books.iter().map(|b| b.title.as_str()).collect::<Vec<_>>()),
        Column::new(AUTHOR.into(), books.iter().map(|b| b.author.as_str()).collect::<Vec<_>>()),
        Column::new(RATING.into(), books.iter().map(|b| b.rating).collect::<Vec<f64>>()),
        Column::new(GENRE.into(), books.iter().map(|b| b.genre.as_str()).collect::<Vec<_>>()),
        Column::new(PAGES.into(), books.iter().map(|b| b.pages).collect::<Vec<_>>()),
        Column::new(REVIEWS.into(), books.iter().map(|b| b.reviews).collect::<Vec<_>>()),
        Column::new(
            BOOKFORMAT.into(),
            books.iter().map(|b| b.bookformat.as_deref()).collect::<Vec<_>>(),
        ),
    ])
}

/// Read a cleaned frame back as records, in row order.
pub fn records(df: &DataFrame) -> PolarsResult<Vec<BookRecord>> {
    let title = strings(df, TITLE)?;
    let author = strings(df, AUTHOR)?;
    let rating = floats(df, RATING)?;
    let genre = strings(df, GENRE)?;
    let pages = page_counts(df)?;
    let reviews = review_counts(df)?;
    let bookformat = strings(df, BOOKFORMAT)?;

    Ok((0..df.height())
        .filter_map(|i| {
            Some(BookRecord {
                title: title.get(i)?.to_string(),
                author: author.get(i)?.to_string(),
                rating: rating.get(i)?,
                reviews: reviews.get(i),
                pages: pages.get(i),
                genre: genre.get(i)?.to_string(),
                bookformat: bookformat.get(i).map(String::from),
            })
        })
        .collect())
}

/// Observed page bounds; `None` when no row has a page count.
pub fn pages_bounds(df: &DataFrame) -> PolarsResult<Option<PagesBounds>> {
    let pages = page_counts(df)?;
    Ok(match (pages.min(), pages.max()) {
        (Some(min), Some(max)) => Some(PagesBounds { min, max }),
        _ => None,
    })
}
