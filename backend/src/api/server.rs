//! HTTP server for the book dashboard.
//!
//! Holds a single active [`Session`]; a new upload replaces it.
//!
//! # API Endpoints
//!
//! | Method | Path           | Description                              |
//! |--------|----------------|------------------------------------------|
//! | GET    | `/health`      | Health check                             |
//! | POST   | `/api/upload`  | Upload a book CSV (multipart `file`)     |
//! | GET    | `/api/views`   | The view menu                            |
//! | GET    | `/api/genres`  | Genre options and pages bounds           |
//! | POST   | `/api/query`   | Apply filters, render a view and table   |
//! | GET    | `/api/logs`    | SSE stream for real-time logs            |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{
    error_response, view_menu, GenresResponse, QueryRequest, QueryResponse, UploadResponse, ViewInfo,
};
use crate::config::{ServerConfig, RATING_STEP};
use crate::error::{ServerError, ServerResult};
use crate::session::Session;
use crate::transform::View;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Option<Session>>>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            config,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Data(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Query(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NoSession => StatusCode::CONFLICT,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Build the router. Exposed for integration tests.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route(
            "/api/upload",
            post(upload_csv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/views", get(list_views))
        .route("/api/genres", get(genres))
        .route("/api/query", post(query))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_router(AppState::new(config));

    log::info!("Bookdash server running on http://localhost:{}", addr.port());
    log::info!("  POST /api/upload - Upload book CSV");
    log::info!("  POST /api/query  - Filter and render a view");
    log::info!("  GET  /api/logs   - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bookdash",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "query": "POST /api/query",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn list_views() -> Json<Vec<ViewInfo>> {
    Json(view_menu())
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(String::from);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".into()))?;

    let session = Session::from_bytes(&bytes, file_name).map_err(|e| {
        log_error(format!("Upload rejected: {}", e));
        ServerError::from(e)
    })?;

    let response = UploadResponse::from(&session);
    *state.session.write().await = Some(session);

    Ok(Json(response))
}

/// Genre options for the active session
async fn genres(State(state): State<AppState>) -> ServerResult<Json<GenresResponse>> {
    let guard = state.session.read().await;
    let session = guard.as_ref().ok_or(ServerError::NoSession)?;

    Ok(Json(GenresResponse {
        session_id: session.id().to_string(),
        genres: session.genres().to_vec(),
        pages_bounds: session.pages_bounds(),
        rating_step: RATING_STEP,
        filters: session.filters().clone(),
    }))
}

/// Apply filters and render the selected view plus the book table
async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ServerResult<Json<QueryResponse>> {
    let view = match request.view.as_deref() {
        Some(id) => id.parse::<View>()?,
        None => View::default(),
    };

    let mut guard = state.session.write().await;
    let session = guard.as_mut().ok_or(ServerError::NoSession)?;

    if let Some(filters) = request.filters {
        session.set_filters(filters)?;
    }

    let filtered_count = session.filtered()?.height();
    let output = session.render(view)?;
    let mut table = session.display_table()?;
    if let Some(limit) = request.limit {
        table.truncate(limit);
    }

    log_info(format!(
        "{}: {} of {} books match",
        view,
        filtered_count,
        session.book_count()
    ));

    Ok(Json(QueryResponse {
        status: if output.is_empty() { "empty" } else { "ready" }.to_string(),
        filtered_count,
        total_count: session.book_count(),
        filters: session.filters().clone(),
        view: output,
        table,
    }))
}
