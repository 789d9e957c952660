//! # Bookdash - filter and summarize book metadata CSVs
//!
//! Bookdash loads a CSV of book metadata (title, author, rating, genre,
//! pages, reviews, bookformat), lets a dashboard filter it by genre, rating
//! and page count, and computes one of nine chart summaries plus a sorted
//! book table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│    Clean    │────▶│   Session   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (drop NA)   │     │ (filters)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                     ┌──────────────┼──────────────┐
//!                                                     ▼              ▼              ▼
//!                                                  filtered      view chart    display table
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bookdash::{Session, View};
//!
//! let session = Session::from_path("books.csv".as_ref())?;
//! let chart = session.render(View::TopGenresByRating)?;
//! println!("{}", serde_json::to_string_pretty(&chart)?);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Constants and server settings
//! - [`models`] - Book record and filter parameters
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Cleaning, filters, aggregates, views, display table
//! - [`session`] - Per-upload context object
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Session state
pub mod session;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DataError, QueryError, ServerError};

pub use models::{BookRecord, FilterParams, Interval, PagesBounds};

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file,
    parse_string, RawTable,
};

pub use transform::{
    apply_filters, clean, display_table, render_view, top_genres_by_rating, Chart, DisplayTable,
    LoadReport, View, ViewOutput,
};

pub use session::Session;

pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::{create_router, start_server, AppState};
}
