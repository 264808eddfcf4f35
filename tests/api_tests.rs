//! API integration tests
//!
//! Drive the real router in-process; no running server required.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use toolcrib_server::{
    api,
    config::AppConfig,
    services::Services,
    store::Store,
    AppState,
};

const OWNER_KEY: &str = "0xf85079078afdf384d84bf54a42bc7c75d39b968d";
const NON_OWNER_KEY: &str = "0xfdc8671a3e511bd0e751f77be022ee072be25da7";

fn test_router() -> Router {
    let mut config = AppConfig::default();
    config.owner.identity = OWNER_KEY.to_string();

    let store = Store::new(&config.store, &config.idempotency);
    let services = Services::new(store, &config);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    api::create_router(state)
}

async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).expect("Response is not JSON");
    (status, body)
}

async fn invoke(
    router: &Router,
    operation: &str,
    idempotency_key: &str,
    caller: &str,
    input: Value,
) -> (StatusCode, Value) {
    let payload = json!({
        "idempotencyKey": idempotency_key,
        "input": input,
        "key": caller,
        "options": {}
    });

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/invoke/{}", operation))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("Failed to build request"),
        )
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).expect("Response is not JSON");
    (status, body)
}

fn laptop_input() -> Value {
    json!({
        "_id": "1",
        "_equipment_name": "Laptop",
        "_description": "MacBook Pro M2 Max, 32GB RAM, 1TB SSD",
        "_equipmentType": "Computing"
    })
}

#[tokio::test]
async fn test_health_check() {
    let router = test_router();
    let (status, body) = get(&router, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_owner_lookup() {
    let router = test_router();
    let (status, body) = invoke(&router, "owner", "k-owner", "", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"], OWNER_KEY);
}

#[tokio::test]
async fn test_add_and_get_details_round_trip() {
    let router = test_router();

    let (status, body) = invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["equipment"]["id"], "1");
    assert_eq!(body["equipment"]["status"], "Available");

    let (status, details) = invoke(
        &router,
        "getEquipmentDetails",
        "k2",
        "",
        json!({"_id": "1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["name"], "Laptop");
    assert_eq!(details["status"], "Available");
    assert!(details["checked_out_by"].is_null());
    assert!(details["last_checked_out_at"].is_null());
}

#[tokio::test]
async fn test_admin_operations_require_owner() {
    let router = test_router();

    let (status, body) = invoke(
        &router,
        "addEquipment",
        "k1",
        NON_OWNER_KEY,
        laptop_input(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    // Anonymous callers are never the owner
    let (status, _) = invoke(&router, "addEquipment", "k2", "", laptop_input()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    invoke(&router, "addEquipment", "k3", OWNER_KEY, laptop_input()).await;

    let (status, body) = invoke(
        &router,
        "removeEquipment",
        "k4",
        NON_OWNER_KEY,
        json!({"_id": "1", "_removalReason": "Unauthorized Attempt"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = invoke(
        &router,
        "updateEquipmentStatus",
        "k5",
        NON_OWNER_KEY,
        json!({"_id": "1", "_newStatus": "Lost", "_statusReason": "Unauthorized Attempt"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing leaked through
    let (_, details) = invoke(
        &router,
        "getEquipmentDetails",
        "k6",
        "",
        json!({"_id": "1"}),
    )
    .await;
    assert_eq!(details["status"], "Available");
}

#[tokio::test]
async fn test_duplicate_id_is_conflict() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let (status, body) = invoke(&router, "addEquipment", "k2", OWNER_KEY, laptop_input()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicateId");
}

#[tokio::test]
async fn test_checkout_lifecycle() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    // Checkout succeeds for an anonymous caller
    let (status, body) = invoke(
        &router,
        "checkoutEquipment",
        "k2",
        "",
        json!({"_id": "1", "_borrowerName": "John Doe"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equipment"]["status"], "CheckedOut");
    assert_eq!(body["equipment"]["checked_out_by"], "John Doe");

    // Second checkout fails while checked out
    let (status, body) = invoke(
        &router,
        "checkoutEquipment",
        "k3",
        "",
        json!({"_id": "1", "_borrowerName": "Jane"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidState");

    // Open record visible in the borrower's history
    let (_, history) = invoke(
        &router,
        "getUserCheckouts",
        "k4",
        "",
        json!({"_user": "John Doe"}),
    )
    .await;
    let records = history["data"].as_array().expect("history is an array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["equipment_id"], "1");
    assert!(records[0]["returned_at"].is_null());

    // Return closes the record and frees the item
    let (status, body) = invoke(&router, "returnEquipment", "k5", "", json!({"_id": "1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equipment"]["status"], "Available");
    assert!(body["equipment"]["checked_out_by"].is_null());

    let (_, history) = invoke(
        &router,
        "getUserCheckouts",
        "k6",
        "",
        json!({"_user": "John Doe"}),
    )
    .await;
    let records = history["data"].as_array().expect("history is an array");
    assert_eq!(records.len(), 1);
    assert!(!records[0]["returned_at"].is_null());

    // Returning twice is an invalid state
    let (status, _) = invoke(&router, "returnEquipment", "k7", "", json!({"_id": "1"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_identical_retry_is_byte_identical_and_side_effect_free() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let input = json!({"_id": "1", "_borrowerName": "John Doe"});
    let (status1, body1) = invoke(&router, "checkoutEquipment", "k2", "", input.clone()).await;
    let (status2, body2) = invoke(&router, "checkoutEquipment", "k2", "", input.clone()).await;
    let (status3, body3) = invoke(&router, "checkoutEquipment", "k2", "", input).await;

    assert_eq!(status1, StatusCode::OK);
    assert_eq!(status2, status1);
    assert_eq!(status3, status1);
    assert_eq!(body2, body1);
    assert_eq!(body3, body1);

    // Only one checkout record was created
    let (_, history) = invoke(
        &router,
        "getUserCheckouts",
        "k3",
        "",
        json!({"_user": "John Doe"}),
    )
    .await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_idempotency_key_conflict() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    // Same key, different input
    let (status, body) = invoke(
        &router,
        "checkoutEquipment",
        "k1",
        "",
        json!({"_id": "1", "_borrowerName": "John Doe"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "IdempotencyKeyConflict");
}

#[tokio::test]
async fn test_unauthorized_outcome_is_replayed() {
    let router = test_router();

    let (status1, body1) = invoke(
        &router,
        "addEquipment",
        "k1",
        NON_OWNER_KEY,
        laptop_input(),
    )
    .await;
    let (status2, body2) = invoke(
        &router,
        "addEquipment",
        "k1",
        NON_OWNER_KEY,
        laptop_input(),
    )
    .await;
    assert_eq!(status1, StatusCode::UNAUTHORIZED);
    assert_eq!(status2, status1);
    assert_eq!(body2, body1);
}

#[tokio::test]
async fn test_update_status_transitions() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let (status, body) = invoke(
        &router,
        "updateEquipmentStatus",
        "k2",
        OWNER_KEY,
        json!({"_id": "1", "_newStatus": "Maintenance", "_statusReason": "Routine inspection"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equipment"]["status"], "Maintenance");

    // Not checkable while in maintenance
    let (status, body) = invoke(
        &router,
        "checkoutEquipment",
        "k3",
        "",
        json!({"_id": "1", "_borrowerName": "John Doe"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidState");

    // Removal is not reachable through a status update
    let (status, _) = invoke(
        &router,
        "updateEquipmentStatus",
        "k4",
        OWNER_KEY,
        json!({"_id": "1", "_newStatus": "Removed", "_statusReason": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown labels are invalid input
    let (status, body) = invoke(
        &router,
        "updateEquipmentStatus",
        "k5",
        OWNER_KEY,
        json!({"_id": "1", "_newStatus": "Broken", "_statusReason": "typo"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidInput");
}

#[tokio::test]
async fn test_removed_equipment_is_terminal() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let (status, _) = invoke(
        &router,
        "removeEquipment",
        "k2",
        OWNER_KEY,
        json!({"_id": "1", "_removalReason": "Depreciated"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = invoke(
        &router,
        "checkoutEquipment",
        "k3",
        "",
        json!({"_id": "1", "_borrowerName": "John Doe"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = invoke(
        &router,
        "updateEquipmentStatus",
        "k4",
        OWNER_KEY,
        json!({"_id": "1", "_newStatus": "Available", "_statusReason": "revive"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Retained for audit lookups, excluded from the listing
    let (status, details) = invoke(
        &router,
        "getEquipmentDetails",
        "k5",
        "",
        json!({"_id": "1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["status"], "Removed");
    assert_eq!(details["status_reason"], "Depreciated");

    let (_, all) = invoke(&router, "getAllEquipment", "k6", "", json!({})).await;
    assert!(all["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_all_equipment() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;
    invoke(
        &router,
        "addEquipment",
        "k2",
        OWNER_KEY,
        json!({
            "_id": "10",
            "_equipment_name": "Professional Camera",
            "_description": "Sony Alpha A7 III Mirrorless Camera",
            "_equipmentType": "Photography"
        }),
    )
    .await;

    let (status, body) = invoke(&router, "getAllEquipment", "k3", "", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let data = body["data"].as_array().expect("data is an array");
    assert_eq!(data.len(), 2);
    let names: Vec<&str> = data.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"Laptop"));
    assert!(names.contains(&"Professional Camera"));
}

#[tokio::test]
async fn test_unknown_operation() {
    let router = test_router();
    let (status, body) = invoke(&router, "renameEquipment", "k1", "", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "UnknownOperation");
}

#[tokio::test]
async fn test_missing_input_fields_are_invalid() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let (status, body) = invoke(&router, "checkoutEquipment", "k2", "", json!({"_id": "1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidInput");

    let (status, _) = invoke(&router, "getUserCheckouts", "k3", "", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_on_missing_equipment_is_not_found() {
    let router = test_router();
    let (status, body) = invoke(
        &router,
        "checkoutEquipment",
        "k1",
        "",
        json!({"_id": "404", "_borrowerName": "John Doe"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_user_checkouts_are_most_recent_first() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;
    invoke(
        &router,
        "addEquipment",
        "k2",
        OWNER_KEY,
        json!({
            "_id": "2",
            "_equipment_name": "Drill",
            "_equipmentType": "Workshop"
        }),
    )
    .await;

    invoke(
        &router,
        "checkoutEquipment",
        "k3",
        "",
        json!({"_id": "1", "_borrowerName": "Emily Rodriguez"}),
    )
    .await;
    invoke(&router, "returnEquipment", "k4", "", json!({"_id": "1"})).await;
    invoke(
        &router,
        "checkoutEquipment",
        "k5",
        "",
        json!({"_id": "2", "_borrowerName": "Emily Rodriguez"}),
    )
    .await;

    let (_, history) = invoke(
        &router,
        "getUserCheckouts",
        "k6",
        "",
        json!({"_user": "Emily Rodriguez"}),
    )
    .await;
    let records = history["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["equipment_id"], "2");
    assert!(records[0]["returned_at"].is_null());
    assert_eq!(records[1]["equipment_id"], "1");
    assert!(!records[1]["returned_at"].is_null());

    // An identity with no history gets an empty list, not an error
    let (status, history) = invoke(
        &router,
        "getUserCheckouts",
        "k7",
        "",
        json!({"_user": "0x90ca4a0c9a834c9ec86db1a93a8a4abe23ed26c4"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(history["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_checkouts_one_winner() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let (a, b) = tokio::join!(
        invoke(
            &router,
            "checkoutEquipment",
            "k2",
            "",
            json!({"_id": "1", "_borrowerName": "John Doe"}),
        ),
        invoke(
            &router,
            "checkoutEquipment",
            "k3",
            "",
            json!({"_id": "1", "_borrowerName": "Jane"}),
        ),
    );

    let statuses = [a.0, b.0];
    assert!(statuses.contains(&StatusCode::OK));
    assert!(statuses.contains(&StatusCode::CONFLICT));
}

#[tokio::test]
async fn test_concurrent_same_key_single_execution() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let input = json!({"_id": "1", "_borrowerName": "John Doe"});
    let (a, b) = tokio::join!(
        invoke(&router, "checkoutEquipment", "k2", "", input.clone()),
        invoke(&router, "checkoutEquipment", "k2", "", input.clone()),
    );

    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_eq!(a.1, b.1);

    let (_, history) = invoke(
        &router,
        "getUserCheckouts",
        "k3",
        "",
        json!({"_user": "John Doe"}),
    )
    .await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_equipment_feed_endpoints() {
    let router = test_router();
    invoke(&router, "addEquipment", "k1", OWNER_KEY, laptop_input()).await;

    let (status, body) = get(&router, "/api/v1/equipment").await;
    assert_eq!(status, StatusCode::OK);
    let feed = body["equipment"].as_array().expect("feed is an array");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["name"], "Laptop");

    let (status, item) = get(&router, "/api/v1/equipment/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["id"], "1");

    let (status, body) = get(&router, "/api/v1/equipment/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}
