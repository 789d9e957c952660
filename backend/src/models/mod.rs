//! Domain models for the book dashboard.
//!
//! - [`BookRecord`] - one cleaned row of the uploaded CSV
//! - [`Interval`] - inclusive numeric range used by the sliders
//! - [`FilterParams`] - genre selection plus rating and pages intervals
//! - [`PagesBounds`] - observed min/max page count of a dataset

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::config::{DEFAULT_PAGES_RANGE, DEFAULT_RATING_RANGE, RATING_MAX, RATING_MIN};
use crate::error::{QueryError, QueryResult};

// =============================================================================
// Book Record
// =============================================================================

/// A book that survived cleaning.
///
/// `title`, `author`, `rating` and `genre` are always present. The remaining
/// fields may be missing in the source and are kept as `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub rating: f64,
    pub reviews: Option<u64>,
    pub pages: Option<u32>,
    /// Raw comma-separated genre string, untrimmed.
    pub genre: String,
    pub bookformat: Option<String>,
}

// =============================================================================
// Intervals
// =============================================================================

/// Inclusive interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval<T> {
    pub lo: T,
    pub hi: T,
}

impl<T: PartialOrd + Copy + Display> Interval<T> {
    /// Build an interval, rejecting reversed or unordered (NaN) bounds.
    pub fn new(field: &'static str, lo: T, hi: T) -> QueryResult<Self> {
        let interval = Self { lo, hi };
        interval.check(field)?;
        Ok(interval)
    }

    fn check(&self, field: &'static str) -> QueryResult<()> {
        match self.lo.partial_cmp(&self.hi) {
            Some(std::cmp::Ordering::Greater) => {
                Err(self.invalid(field, "lower bound exceeds upper bound"))
            }
            Some(_) => Ok(()),
            None => Err(self.invalid(field, "bounds are not comparable")),
        }
    }

    fn invalid(&self, field: &'static str, reason: &str) -> QueryError {
        QueryError::InvalidInterval {
            field,
            lo: self.lo.to_string(),
            hi: self.hi.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Observed page-count bounds of a dataset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagesBounds {
    pub min: u32,
    pub max: u32,
}

// =============================================================================
// Filter Parameters
// =============================================================================

/// Everything the filter controls send to the transformer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Selected genres; empty means no genre restriction.
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: Interval<f64>,
    pub pages: Interval<u32>,
}

impl FilterParams {
    /// Initial slider positions for a dataset.
    ///
    /// The pages interval is clamped into `bounds` so it never sits outside
    /// the slider's range.
    pub fn defaults_for(bounds: Option<PagesBounds>) -> Self {
        let (mut lo, mut hi) = DEFAULT_PAGES_RANGE;
        if let Some(b) = bounds {
            lo = lo.max(b.min).min(b.max);
            hi = hi.min(b.max).max(lo);
        }
        Self {
            genres: Vec::new(),
            rating: Interval {
                lo: DEFAULT_RATING_RANGE.0,
                hi: DEFAULT_RATING_RANGE.1,
            },
            pages: Interval { lo, hi },
        }
    }

    /// Filters that keep every book with a known page count.
    pub fn unrestricted(bounds: PagesBounds) -> Self {
        Self {
            genres: Vec::new(),
            rating: Interval {
                lo: RATING_MIN,
                hi: RATING_MAX,
            },
            pages: Interval {
                lo: bounds.min,
                hi: bounds.max,
            },
        }
    }

    /// Check interval ordering and the rating domain.
    pub fn validate(&self) -> QueryResult<()> {
        self.rating.check("rating")?;
        self.pages.check("pages")?;
        if self.rating.lo < RATING_MIN || self.rating.hi > RATING_MAX {
            return Err(self.rating.invalid("rating", "bounds must lie within [0, 5]"));
        }
        Ok(())
    }
}
