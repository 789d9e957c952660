//! Dashboard configuration.
//!
//! Fixed dashboard constants live here as plain consts. Server settings are
//! read from the environment (after `dotenvy` has loaded any `.env` file) and
//! can be overridden by CLI flags.

use std::env;

/// Columns an upload must carry. Matching is exact and case-sensitive.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "title",
    "author",
    "rating",
    "genre",
    "pages",
    "reviews",
    "bookformat",
];

/// Columns whose absence drops a row during cleaning.
pub const NOT_NULL_COLUMNS: [&str; 4] = ["title", "author", "rating", "genre"];

/// Columns shown in the book table, in display order.
pub const DISPLAY_COLUMNS: [&str; 6] = ["title", "author", "rating", "reviews", "pages", "genre"];

/// Number of bins for the rating and pages histograms.
pub const HISTOGRAM_BINS: usize = 30;

/// Row cap for every "top" ranking.
pub const TOP_N: usize = 10;

/// Rating slider domain.
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;

/// Rating slider step.
pub const RATING_STEP: f64 = 0.1;

/// Initial rating interval.
pub const DEFAULT_RATING_RANGE: (f64, f64) = (3.0, 5.0);

/// Initial pages interval, clamped into the dataset's observed bounds.
pub const DEFAULT_PAGES_RANGE: (u32, u32) = (50, 500);

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Largest accepted upload body.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Build from `BOOKDASH_PORT` and `BOOKDASH_MAX_UPLOAD_MB`.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("BOOKDASH_PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);

        let max_upload_bytes = lookup("BOOKDASH_MAX_UPLOAD_MB")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            port,
            max_upload_bytes,
        }
    }

    /// Override the port (from a CLI flag).
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(p) = port {
            self.port = p;
        }
        self
    }
}
