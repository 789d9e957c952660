//! Book table transformation over polars frames.
//!
//! - `frame`: column names and frame/record conversion
//! - `clean`: raw CSV frame to the typed book frame
//! - `filter`: range and genre filter expressions
//! - `aggregate`: counts, means, rankings, histograms
//! - `views`: the chart menu
//! - `display`: the sorted book table
//!
//! ```text
//! RawTable → clean → DataFrame ─┬─ apply_filters → filtered ─┬─ display_table
//!                               │                            └─ render_view (scatter, histogram)
//!                               └─ render_view (rankings, counts)
//! ```

pub mod aggregate;
pub mod clean;
pub mod display;
pub mod filter;
pub mod frame;
pub mod views;

pub use clean::{clean, Cleaned, LoadReport};
pub use display::{display_table, DisplayRow, DisplayTable};
pub use filter::{apply_filters, filter_expr, in_range, matches_genres};
pub use frame::{records, to_frame};
pub use views::{render_view, top_genres_by_rating, Bar, Chart, ScatterPoint, View, ViewOutput};
