//! Integration tests for the Bookdash HTTP API
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`:
//! - Health and view menu
//! - CSV upload (multipart), including missing-column rejection
//! - Filter/view queries, empty results, invalid parameters

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookdash::config::ServerConfig;
use bookdash::server::{create_router, AppState};

const BOOKS_CSV: &str = "\
title,author,rating,genre,pages,reviews,bookformat
Lost One,Ann,3.9,,300,4,Paperback
Lost Two,Bob,4.1,,200,9,Hardcover
Quest,Cat,4.2,\"Fantasy, Adventure\",120,40,Paperback
Hearts,Dan,2.0,Romance,700,12,Hardcover
Dragons,Eve,4.8,Fantasy,50,95,Kindle Edition
";

const BOUNDARY: &str = "bookdash-test-boundary";

fn setup() -> axum::Router {
    create_router(AppState::new(ServerConfig::default()))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn get(app: &axum::Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn post_json(app: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn upload(app: &axum::Router, csv: &str) -> (StatusCode, Value) {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"books.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup();
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "bookdash");
}

#[tokio::test]
async fn test_views_menu() {
    let app = setup();
    let (status, body) = get(&app, "/api/views").await;

    assert_eq!(status, StatusCode::OK);
    let views = body.as_array().unwrap();
    assert_eq!(views.len(), 9);
    assert_eq!(views[0]["id"], "rating-vs-pages");
    assert_eq!(views[0]["isDefault"], true);
}

#[tokio::test]
async fn test_query_before_upload_conflicts() {
    let app = setup();

    let (status, body) = post_json(&app, "/api/query", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");

    let (status, _) = get(&app, "/api/genres").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upload_then_query() {
    let app = setup();

    let (status, body) = upload(&app, BOOKS_CSV).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "warning");
    assert_eq!(body["sourceName"], "books.csv");
    assert_eq!(body["metadata"]["rawRows"], 5);
    assert_eq!(body["metadata"]["keptRows"], 3);
    assert_eq!(body["genres"], json!([" Adventure", "Fantasy", "Romance"]));
    assert_eq!(body["pagesBounds"], json!({"min": 50, "max": 700}));
    assert_eq!(body["ratingStep"], 0.1);

    let (status, body) = post_json(
        &app,
        "/api/query",
        json!({
            "view": "rating-vs-pages",
            "filters": {"genres": [], "rating": {"lo": 3.0, "hi": 5.0}, "pages": {"lo": 50, "hi": 500}}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["filteredCount"], 2);
    assert_eq!(body["totalCount"], 3);
    assert_eq!(body["view"]["chart"]["kind"], "scatter");
    assert_eq!(body["table"]["rows"][0]["title"], "Dragons");
    assert_eq!(body["table"]["rows"][1]["title"], "Quest");
    assert_eq!(body["table"]["rows"][1]["index"], 1);
}

#[tokio::test]
async fn test_top_genre_view_ignores_filters() {
    let app = setup();
    upload(&app, BOOKS_CSV).await;

    let (status, body) = post_json(
        &app,
        "/api/query",
        json!({
            "view": "top-genres-by-rating",
            "filters": {"genres": ["Romance"], "rating": {"lo": 0.0, "hi": 5.0}, "pages": {"lo": 0, "hi": 1000}}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filteredCount"], 1);
    let bars = body["view"]["chart"]["bars"].as_array().unwrap();
    assert_eq!(bars[0]["label"], "Fantasy");
    assert!((bars[0]["value"].as_f64().unwrap() - 4.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_filters_persist_between_queries() {
    let app = setup();
    upload(&app, BOOKS_CSV).await;

    post_json(
        &app,
        "/api/query",
        json!({"filters": {"genres": ["Fiction"], "rating": {"lo": 0.0, "hi": 5.0}, "pages": {"lo": 0, "hi": 1000}}}),
    )
    .await;

    let (status, body) = post_json(&app, "/api/query", json!({"view": "rating-distribution"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "empty");
    assert_eq!(body["filteredCount"], 0);
    assert_eq!(body["filters"]["genres"], json!(["Fiction"]));
    assert_eq!(body["view"]["chart"]["bins"], json!([]));
    assert_eq!(body["table"]["rows"], json!([]));

    // rankings read the full table, so they still have bars to draw
    let (status, body) = post_json(&app, "/api/query", json!({"view": "prolific-authors"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["filteredCount"], 0);
    assert_eq!(body["view"]["chart"]["bars"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_genres_endpoint_after_upload() {
    let app = setup();
    upload(&app, BOOKS_CSV).await;

    let (status, body) = get(&app, "/api/genres").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genres"], json!([" Adventure", "Fantasy", "Romance"]));
    assert_eq!(body["ratingStep"], 0.1);
    assert_eq!(body["filters"]["rating"], json!({"lo": 3.0, "hi": 5.0}));
}

#[tokio::test]
async fn test_invalid_query_parameters() {
    let app = setup();
    upload(&app, BOOKS_CSV).await;

    let (status, body) = post_json(&app, "/api/query", json!({"view": "pie-chart"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("pie-chart"));

    let (status, _) = post_json(
        &app,
        "/api/query",
        json!({"filters": {"rating": {"lo": 5.0, "hi": 1.0}, "pages": {"lo": 0, "hi": 10}}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_missing_columns_rejected() {
    let app = setup();
    let (status, body) = upload(&app, "title,author,rating\nA,B,4.0\n").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let msg = body["error"].as_str().unwrap();
    assert!(msg.contains("genre"));
    assert!(msg.contains("bookformat"));

    // still no session after a failed upload
    let (status, _) = get(&app, "/api/genres").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup();
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("No file"));
}
