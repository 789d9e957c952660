//! REST API types for the dashboard frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::RATING_STEP;
use crate::models::{FilterParams, PagesBounds};
use crate::session::Session;
use crate::transform::{DisplayTable, View, ViewOutput};

/// Response sent after a CSV upload was loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: String,

    /// "ready", "warning" (rows dropped) or "empty" (nothing kept)
    pub status: String,

    pub source_name: Option<String>,

    pub loaded_at: DateTime<Utc>,

    pub metadata: CsvMetadata,

    /// Options for the genre selector
    pub genres: Vec<String>,

    /// Range for the pages slider
    pub pages_bounds: Option<PagesBounds>,

    /// Increment of the rating slider
    pub rating_step: f64,

    /// Initial filter positions
    pub filters: FilterParams,

    pub views: Vec<ViewInfo>,
}

/// Uploaded file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub raw_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    pub columns: Vec<String>,
}

/// Entry of the view selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewInfo {
    pub id: String,
    pub title: String,
    pub is_default: bool,
}

impl From<View> for ViewInfo {
    fn from(view: View) -> Self {
        Self {
            id: view.id().to_string(),
            title: view.title().to_string(),
            is_default: view == View::default(),
        }
    }
}

/// The whole view menu, in order.
pub fn view_menu() -> Vec<ViewInfo> {
    View::ALL.into_iter().map(ViewInfo::from).collect()
}

impl From<&Session> for UploadResponse {
    fn from(session: &Session) -> Self {
        let report = session.report();
        let status = if report.kept_rows == 0 {
            "empty"
        } else if report.dropped_rows > 0 {
            "warning"
        } else {
            "ready"
        };

        UploadResponse {
            session_id: session.id().to_string(),
            status: status.to_string(),
            source_name: session.source_name().map(String::from),
            loaded_at: session.loaded_at(),
            metadata: CsvMetadata {
                encoding: report.encoding.clone(),
                delimiter: report.delimiter.to_string(),
                raw_rows: report.raw_rows,
                kept_rows: report.kept_rows,
                dropped_rows: report.dropped_rows,
                columns: report.headers.clone(),
            },
            genres: session.genres().to_vec(),
            pages_bounds: session.pages_bounds(),
            rating_step: RATING_STEP,
            filters: session.filters().clone(),
            views: view_menu(),
        }
    }
}

/// Genre selector contents for the active session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenresResponse {
    pub session_id: String,
    pub genres: Vec<String>,
    pub pages_bounds: Option<PagesBounds>,
    pub rating_step: f64,
    pub filters: FilterParams,
}

/// One interaction: new filters and/or another view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Replaces the session filters when present
    #[serde(default)]
    pub filters: Option<FilterParams>,

    /// View identifier; the default view when absent
    #[serde(default)]
    pub view: Option<String>,

    /// Cap on returned table rows
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Chart and table for the current filters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// "ready", or "empty" when the rendered view has nothing to draw
    pub status: String,
    pub filtered_count: usize,
    pub total_count: usize,
    pub filters: FilterParams,
    pub view: ViewOutput,
    pub table: DisplayTable,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
