//! Shared test utilities for roomap API tests.

// Used from several test binaries; each one sees only part of it.
#![allow(dead_code)]

use std::io::Read;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use flate2::read::GzDecoder;
use tower::ServiceExt;

use roomap_api::http::{create_router, AppState};
use roomap_storage::MemoryRoomStore;

/// Creates a router over `store` with default resolver settings.
pub fn create_test_app(store: &Arc<MemoryRoomStore>) -> Router {
    create_router(AppState::new(Arc::clone(store)))
}

/// Stores `rooms` as `(name, id)` pairs under `room_map:{hotel}`.
pub fn seed_hotel(store: &MemoryRoomStore, hotel: &str, rooms: &[(&str, i64)]) {
    store.insert_hash(
        format!("room_map:{{{hotel}}}"),
        rooms
            .iter()
            .map(|(name, id)| (name.to_string(), format!(r#"{{"id":{id}}}"#))),
    );
}

/// Sends a GET and returns status and decoded JSON body.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Sends a POST with a JSON body and returns status and decoded JSON body.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Sends a POST asking for gzip and returns the decompressed JSON body.
pub async fn post_json_gzip(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::ACCEPT_ENCODING, "gzip")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");

    let compressed = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let mut decoded = Vec::new();
    GzDecoder::new(&compressed[..])
        .read_to_end(&mut decoded)
        .unwrap();
    (status, serde_json::from_slice(&decoded).unwrap())
}
