//! The nine dashboard views and their chart payloads.
//!
//! Scatter and histogram views read the filtered rows. Ranking and count
//! views read the full cleaned table, whatever the filters say.
//!
//! | View                     | Source   | Shape     | Cap |
//! |--------------------------|----------|-----------|-----|
//! | `rating-vs-pages`        | filtered | scatter   |  -  |
//! | `top-genres-by-rating`   | full     | bar       | 10  |
//! | `rating-distribution`    | filtered | histogram |  -  |
//! | `pages-distribution`     | filtered | histogram |  -  |
//! | `books-per-format`       | full     | bar       |  -  |
//! | `rating-vs-reviews`      | filtered | scatter   |  -  |
//! | `prolific-authors`       | full     | bar       | 10  |
//! | `popular-genres`         | full     | bar       | 10  |
//! | `top-authors-by-rating`  | full     | bar       | 10  |

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::aggregate::{
    genre_universe, group_mean, histogram, sort_desc_by_metric, top_n, trimmed_tags,
    value_counts, HistogramBin,
};
use super::frame::{floats, page_counts, records, AUTHOR, BOOKFORMAT, GENRE, RATING};
use crate::config::{HISTOGRAM_BINS, TOP_N};
use crate::error::QueryError;
use crate::models::BookRecord;

// =============================================================================
// View selector
// =============================================================================

/// A chart the user can pick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    RatingVsPages,
    TopGenresByRating,
    RatingDistribution,
    PagesDistribution,
    BooksPerFormat,
    RatingVsReviews,
    ProlificAuthors,
    PopularGenres,
    TopAuthorsByRating,
}

impl View {
    /// Menu order.
    pub const ALL: [View; 9] = [
        View::RatingVsPages,
        View::TopGenresByRating,
        View::RatingDistribution,
        View::PagesDistribution,
        View::BooksPerFormat,
        View::RatingVsReviews,
        View::ProlificAuthors,
        View::PopularGenres,
        View::TopAuthorsByRating,
    ];

    /// Stable identifier used on the wire and the CLI.
    pub fn id(&self) -> &'static str {
        match self {
            View::RatingVsPages => "rating-vs-pages",
            View::TopGenresByRating => "top-genres-by-rating",
            View::RatingDistribution => "rating-distribution",
            View::PagesDistribution => "pages-distribution",
            View::BooksPerFormat => "books-per-format",
            View::RatingVsReviews => "rating-vs-reviews",
            View::ProlificAuthors => "prolific-authors",
            View::PopularGenres => "popular-genres",
            View::TopAuthorsByRating => "top-authors-by-rating",
        }
    }

    /// Chart title.
    pub fn title(&self) -> &'static str {
        match self {
            View::RatingVsPages => "Rating vs Page Count",
            View::TopGenresByRating => "Top 10 Genres by Average Rating",
            View::RatingDistribution => "Book Rating Distribution",
            View::PagesDistribution => "Page Count Distribution",
            View::BooksPerFormat => "Books per Format",
            View::RatingVsReviews => "Rating vs Review Count",
            View::ProlificAuthors => "Top 10 Most Prolific Authors",
            View::PopularGenres => "Top 10 Genres by Book Count",
            View::TopAuthorsByRating => "Top 10 Authors by Average Rating",
        }
    }

    fn axes(&self) -> (&'static str, &'static str) {
        match self {
            View::RatingVsPages => ("Pages", "Rating"),
            View::TopGenresByRating => ("Genre", "Average Rating"),
            View::RatingDistribution => ("Rating", "Count"),
            View::PagesDistribution => ("Pages", "Count"),
            View::BooksPerFormat => ("Format", "Books"),
            View::RatingVsReviews => ("Reviews", "Rating"),
            View::ProlificAuthors => ("Author", "Books"),
            View::PopularGenres => ("Genre", "Books"),
            View::TopAuthorsByRating => ("Author", "Average Rating"),
        }
    }

    fn columns(&self) -> &'static [&'static str] {
        match self {
            View::RatingVsPages => &["pages", "rating", "title", "author", "genre"],
            View::RatingVsReviews => &["reviews", "rating", "title", "author"],
            View::RatingDistribution => &["rating"],
            View::PagesDistribution => &["pages"],
            View::TopGenresByRating | View::PopularGenres => &["genre", "value"],
            View::BooksPerFormat => &["bookformat", "value"],
            View::ProlificAuthors | View::TopAuthorsByRating => &["author", "value"],
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .iter()
            .copied()
            .find(|v| v.id() == s)
            .ok_or_else(|| QueryError::UnknownView(s.to_string()))
    }
}

// =============================================================================
// Chart payloads
// =============================================================================

/// One scatter point plus hover metadata.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

/// One bar; `value` is `None` when the group had no data.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: Option<f64>,
}

/// Data ready for the plotting layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Chart {
    Scatter { points: Vec<ScatterPoint> },
    Bar { bars: Vec<Bar> },
    Histogram { bins: Vec<HistogramBin> },
}

/// A rendered view.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewOutput {
    pub view: View,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub columns: Vec<String>,
    pub chart: Chart,
}

impl ViewOutput {
    /// Nothing to draw. Shown as an empty chart, not an error.
    pub fn is_empty(&self) -> bool {
        match &self.chart {
            Chart::Scatter { points } => points.is_empty(),
            Chart::Bar { bars } => bars.is_empty(),
            Chart::Histogram { bins } => bins.is_empty(),
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Compute a view from the full cleaned frame and the filtered frame.
pub fn render_view(view: View, books: &DataFrame, filtered: &DataFrame) -> PolarsResult<ViewOutput> {
    let chart = match view {
        View::RatingVsPages => {
            scatter(&records(filtered)?, |b| b.pages.map(f64::from), true)
        }
        View::RatingVsReviews => {
            scatter(&records(filtered)?, |b| b.reviews.map(|r| r as f64), false)
        }
        View::RatingDistribution => {
            let ratings: Vec<f64> = floats(filtered, RATING)?.into_iter().flatten().collect();
            Chart::Histogram {
                bins: histogram(&ratings, HISTOGRAM_BINS),
            }
        }
        View::PagesDistribution => {
            let pages: Vec<f64> = page_counts(filtered)?
                .into_iter()
                .flatten()
                .map(f64::from)
                .collect();
            Chart::Histogram {
                bins: histogram(&pages, HISTOGRAM_BINS),
            }
        }
        View::TopGenresByRating => bars(top_genres_by_rating(books)?),
        View::BooksPerFormat => counts_to_bars(value_counts(books.clone().lazy(), BOOKFORMAT)?),
        View::ProlificAuthors => {
            counts_to_bars(top_n(value_counts(books.clone().lazy(), AUTHOR)?, TOP_N))
        }
        View::PopularGenres => {
            counts_to_bars(top_n(value_counts(trimmed_tags(books)?.lazy(), GENRE)?, TOP_N))
        }
        View::TopAuthorsByRating => {
            counts_to_bars(top_n(group_mean(books.clone().lazy(), AUTHOR, RATING)?, TOP_N))
        }
    };

    let (x_label, y_label) = view.axes();
    Ok(ViewOutput {
        view,
        title: view.title().to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        columns: view.columns().iter().map(|c| c.to_string()).collect(),
        chart,
    })
}

/// Mean rating per raw genre tag over every book whose genre contains it.
///
/// Ties keep genre-universe order; tags without data sort last.
pub fn top_genres_by_rating(books: &DataFrame) -> PolarsResult<Vec<(String, Option<f64>)>> {
    let universe = genre_universe(books)?;
    if universe.is_empty() {
        return Ok(Vec::new());
    }

    // one mean per tag, aliased by position since tags may be empty
    let means = books
        .clone()
        .lazy()
        .select(
            universe
                .iter()
                .enumerate()
                .map(|(i, tag)| {
                    col(RATING)
                        .filter(col(GENRE).str().contains_literal(lit(tag.as_str())))
                        .mean()
                        .alias(format!("tag_{i}"))
                })
                .collect::<Vec<_>>(),
        )
        .collect()?;

    let mut ranked = universe
        .into_iter()
        .enumerate()
        .map(|(i, tag)| Ok((tag, floats(&means, &format!("tag_{i}"))?.get(0))))
        .collect::<PolarsResult<Vec<_>>>()?;

    sort_desc_by_metric(&mut ranked, |(_, avg)| *avg);
    Ok(top_n(ranked, TOP_N))
}

fn scatter(rows: &[BookRecord], x: impl Fn(&BookRecord) -> Option<f64>, with_genre: bool) -> Chart {
    let points = rows
        .iter()
        .filter_map(|b| {
            Some(ScatterPoint {
                x: x(b)?,
                y: b.rating,
                title: b.title.clone(),
                author: b.author.clone(),
                genre: with_genre.then(|| b.genre.clone()),
            })
        })
        .collect();
    Chart::Scatter { points }
}

fn bars(entries: Vec<(String, Option<f64>)>) -> Chart {
    Chart::Bar {
        bars: entries
            .into_iter()
            .map(|(label, value)| Bar { label, value })
            .collect(),
    }
}

fn counts_to_bars(counts: Vec<(String, f64)>) -> Chart {
    bars(counts.into_iter().map(|(k, n)| (k, Some(n))).collect())
}
