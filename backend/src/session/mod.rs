//! Session context: one uploaded dataset plus the current filters.
//!
//! A [`Session`] owns the cleaned book frame for as long as the user keeps
//! it. Filtered rows, charts and the display table are derived on every
//! call; nothing is written back and nothing is cached.
//!
//! ```rust,ignore
//! let mut session = Session::from_bytes(&bytes, Some("books.csv".into()))?;
//! session.set_filters(FilterParams { genres: vec!["Fantasy".into()], ..session.filters().clone() })?;
//! let chart = session.render(View::TopGenresByRating)?;
//! let table = session.display_table()?;
//! ```

use chrono::{DateTime, Utc};
use polars::prelude::{DataFrame, PolarsResult};
use uuid::Uuid;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{DataResult, QueryResult};
use crate::models::{BookRecord, FilterParams, PagesBounds};
use crate::parser::{parse_bytes_auto, parse_csv_file, RawTable};
use crate::transform::aggregate::genre_universe;
use crate::transform::frame::pages_bounds;
use crate::transform::{
    apply_filters, clean, display_table, records, render_view, DisplayTable, LoadReport, View,
    ViewOutput,
};

/// A loaded dataset and the filter state applied to it.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    source_name: Option<String>,
    loaded_at: DateTime<Utc>,
    books: DataFrame,
    genres: Vec<String>,
    pages_bounds: Option<PagesBounds>,
    report: LoadReport,
    filters: FilterParams,
}

impl Session {
    /// Load an uploaded CSV.
    pub fn from_bytes(bytes: &[u8], source_name: Option<String>) -> DataResult<Self> {
        log_info(format!(
            "Reading {} ({} bytes)...",
            source_name.as_deref().unwrap_or("upload"),
            bytes.len()
        ));
        let raw = parse_bytes_auto(bytes)?;
        Self::from_raw(raw, source_name)
    }

    /// Load a CSV file from disk.
    pub fn from_path(path: &std::path::Path) -> DataResult<Self> {
        log_info(format!("Reading {}...", path.display()));
        let raw = parse_csv_file(path)?;
        Self::from_raw(raw, Some(path.display().to_string()))
    }

    /// Build from an already parsed table.
    pub fn from_raw(raw: RawTable, source_name: Option<String>) -> DataResult<Self> {
        log_success(format!("Detected encoding: {}", raw.encoding));
        log_success(format!("Detected separator: '{}'", format_delimiter(raw.delimiter)));
        log_success(format!("Read {} rows, {} columns", raw.len(), raw.frame.width()));

        let cleaned = clean(&raw)?;
        if cleaned.report.dropped_rows > 0 {
            log_warning(format!(
                "Dropped {} rows missing title, author, rating or genre",
                cleaned.report.dropped_rows
            ));
        }

        let books = cleaned.books;
        let genres = genre_universe(&books)?;
        let pages_bounds = pages_bounds(&books)?;
        let filters = FilterParams::defaults_for(pages_bounds);

        log_success(format!("{} books ready", books.height()));
        log_info_indent(format!("{} distinct genre tags", genres.len()), 1);
        if let Some(b) = pages_bounds {
            log_info_indent(format!("Pages from {} to {}", b.min, b.max), 1);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            source_name,
            loaded_at: Utc::now(),
            books,
            genres,
            pages_bounds,
            report: cleaned.report,
            filters,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// The full cleaned frame.
    pub fn books(&self) -> &DataFrame {
        &self.books
    }

    pub fn book_count(&self) -> usize {
        self.books.height()
    }

    /// The full cleaned table as records.
    pub fn records(&self) -> PolarsResult<Vec<BookRecord>> {
        records(&self.books)
    }

    /// Sorted raw genre tags, for the genre selector.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn pages_bounds(&self) -> Option<PagesBounds> {
        self.pages_bounds
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn filters(&self) -> &FilterParams {
        &self.filters
    }

    /// Replace the current filters after validating them.
    pub fn set_filters(&mut self, params: FilterParams) -> QueryResult<()> {
        params.validate()?;
        self.filters = params;
        Ok(())
    }

    /// Books passing the current filters, in source order.
    pub fn filtered(&self) -> PolarsResult<DataFrame> {
        apply_filters(&self.books, &self.filters)
    }

    /// Compute one chart against the current filters.
    pub fn render(&self, view: View) -> PolarsResult<ViewOutput> {
        render_view(view, &self.books, &self.filtered()?)
    }

    /// The sorted book table for the current filters.
    pub fn display_table(&self) -> PolarsResult<DisplayTable> {
        display_table(&self.filtered()?)
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
