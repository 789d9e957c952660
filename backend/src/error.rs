//! Error types for the Bookdash transformer.
//!
//! - [`DataError`] - the uploaded file cannot become a book table
//! - [`QueryError`] - filter or view parameters are invalid
//! - [`ServerError`] - HTTP-facing wrapper with status mapping
//!
//! An empty filtered view is *not* an error: every aggregate degrades to an
//! empty result instead (see [`crate::transform::views::ViewOutput::is_empty`]).

use polars::prelude::PolarsError;
use thiserror::Error;

// =============================================================================
// Data Errors
// =============================================================================

/// Errors while turning an uploaded CSV into a cleaned book table.
///
/// Fatal to the current upload; the session stays open for another attempt.
#[derive(Debug, Error)]
pub enum DataError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes could not be decoded as text.
    #[error("Failed to decode file: {0}")]
    Encoding(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Header row present but without any column names.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// A record could not be parsed.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// One or more required columns are absent.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The table could not be built or typed (e.g. duplicate headers).
    #[error("Invalid table: {0}")]
    Frame(#[from] PolarsError),
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors in filter parameters or view selection.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    /// Interval bounds are reversed, NaN, or outside the allowed domain.
    #[error("Invalid {field} interval [{lo}, {hi}]: {reason}")]
    InvalidInterval {
        field: &'static str,
        lo: String,
        hi: String,
        reason: String,
    },

    /// View identifier not in the menu.
    #[error("Unknown view: {0}")]
    UnknownView(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Upload could not be loaded.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Bad filter or view parameters.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Query issued before any dataset was uploaded.
    #[error("No dataset loaded, upload a CSV first")]
    NoSession,

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A query over an already loaded table failed.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<PolarsError> for ServerError {
    fn from(err: PolarsError) -> Self {
        ServerError::Internal(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type DataResult<T> = Result<T, DataError>;

/// Result type for filter/view operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
