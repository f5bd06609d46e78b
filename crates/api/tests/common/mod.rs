#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use uas_api::config::ServerConfig;
use uas_api::router::build_app_router;
use uas_api::state::AppState;
use uas_core::mgrs::UtmGridConverter;
use uas_core::upload::UploadConfig;

pub const TEST_ORIGIN: &str = "http://localhost:3000";

/// Build a test `ServerConfig` storing uploads under `upload_dir`.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![TEST_ORIGIN.to_string()],
        request_timeout_secs: 30,
        upload: UploadConfig {
            upload_dir,
            ..UploadConfig::default()
        },
    }
}

/// Build the full application router for `config`, using the given pool.
///
/// Goes through the same [`build_app_router`] as `main.rs`, so tests exercise
/// the production middleware stack.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        converter: Arc::new(UtmGridConverter),
    };
    build_app_router(state, &config)
}

/// Build the application router with uploads pointed at the system temp dir.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config(std::env::temp_dir().join("uas-api-tests")))
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn json_request(app: Router, method: Method, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::PUT, uri, body).await
}

/// POST a multipart form. Each part is `(field name, file name, bytes)`.
pub async fn post_multipart(app: Router, uri: &str, parts: &[(&str, &str, &[u8])]) -> Response {
    const BOUNDARY: &str = "uas-test-boundary";
    let mut body = Vec::new();
    for (field, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// A valid sighting payload at the given position and time.
pub fn sighting_json(time: &str, latitude: f64, longitude: f64) -> Value {
    serde_json::json!({
        "type_of_sighting": "Quadcopter",
        "time": time,
        "latitude": latitude,
        "longitude": longitude,
        "location_name": "Landstuhl",
        "description": "Hovering near the gate",
    })
}

/// Create a sighting through the API and return its id.
pub async fn create_sighting(pool: &PgPool, payload: Value) -> i64 {
    let response = post_json(build_test_app(pool.clone()), "/sightings", payload).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Ids of a JSON array of sightings, in response order.
pub fn ids(json: &Value) -> Vec<i64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}
