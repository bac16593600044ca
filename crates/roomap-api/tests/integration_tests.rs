//! End-to-end lookups through the HTTP router and the in-memory store.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use roomap_storage::MemoryRoomStore;
use serde_json::json;

use common::{create_test_app, get_json, post_json, post_json_gzip, seed_hotel};

#[tokio::test]
async fn test_batch_reports_found_and_missing_hotels() {
    let store = MemoryRoomStore::new_shared();
    seed_hotel(&store, "42", &[("ocean view", 5), ("Ocean-View", 5)]);

    let (status, body) = post_json(
        create_test_app(&store),
        "/room-mappings/batch",
        json!({ "hotel_ids": ["42", "99"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "42": [{"name": "ocean view", "id": 5}],
            "99": []
        })
    );
}

#[tokio::test]
async fn test_batch_duplicates_share_one_round_trip() {
    let store = MemoryRoomStore::new_shared();
    seed_hotel(&store, "H1", &[("Suite", 1)]);
    seed_hotel(&store, "H2", &[("Loft", 2)]);

    let (status, body) = post_json(
        create_test_app(&store),
        "/room-mappings/batch",
        json!({ "hotel_ids": ["H1", "H1", "#H2"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.pipelined_read_count(), 1);
    assert_eq!(store.single_read_count(), 0);
    assert_eq!(
        body,
        json!({
            "H1": [{"name": "suite", "id": 1}],
            "#H2": [{"name": "loft", "id": 2}]
        })
    );
}

#[tokio::test]
async fn test_batch_over_limit_is_rejected_before_store_access() {
    let store = MemoryRoomStore::new_shared();
    let ids: Vec<String> = (0..101).map(|i| i.to_string()).collect();

    let (status, body) = post_json(
        create_test_app(&store),
        "/room-mappings/batch",
        json!({ "hotel_ids": ids }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert_eq!(store.pipelined_read_count(), 0);
    assert_eq!(store.single_read_count(), 0);
}

#[tokio::test]
async fn test_batch_store_outage_yields_empty_lists() {
    let store = MemoryRoomStore::new_shared();
    seed_hotel(&store, "42", &[("ocean view", 5)]);
    store.set_unavailable(true);

    let (status, body) = post_json(
        create_test_app(&store),
        "/room-mappings/batch",
        json!({ "hotel_ids": ["42"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "42": [] }));
}

#[tokio::test]
async fn test_batch_gzip_body_decodes() {
    let store = MemoryRoomStore::new_shared();
    seed_hotel(&store, "42", &[("ocean view", 5)]);

    let (status, body) = post_json_gzip(
        create_test_app(&store),
        "/room-mappings/batch",
        json!({ "hotel_ids": ["42"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "42": [{"name": "ocean view", "id": 5}] }));
}

#[tokio::test]
async fn test_single_lookup_collapses_colliding_names() {
    let store = MemoryRoomStore::new_shared();
    store.insert_hash(
        "room_map:{7}",
        [
            ("Deluxe Room", r#"{"id":101}"#),
            ("deluxe  room", r#"{"id":102}"#),
        ],
    );

    let (status, body) = get_json(create_test_app(&store), "/room-mappings/7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"name": "deluxe room", "id": 101}]));
}

#[tokio::test]
async fn test_single_lookup_skips_undecodable_fields() {
    let store = MemoryRoomStore::new_shared();
    store.insert_hash(
        "room_map:{8}",
        [
            ("Twin", r#"{"id":3}"#),
            ("Broken", "not json"),
            ("Zero", r#"{"id":0}"#),
        ],
    );

    let (status, body) = get_json(create_test_app(&store), "/room-mappings/8").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"name": "twin", "id": 3}]));
}

#[tokio::test]
async fn test_single_lookup_missing_hotel_is_not_found() {
    let store = MemoryRoomStore::new_shared();

    let (status, body) = get_json(create_test_app(&store), "/room-mappings/99").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "room_mappings_not_found");
    // Primary and alternate spellings were both probed.
    assert_eq!(store.single_read_count(), 2);
}

#[tokio::test]
async fn test_health_follows_store_availability() {
    let store = Arc::new(MemoryRoomStore::new());

    let (status, body) = get_json(create_test_app(&store), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    store.set_unavailable(true);
    let (status, body) = get_json(create_test_app(&store), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}
