//! Tests for the REST API surface.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use slotbook::{create_rest_router, MemoryStore, RestApiConfig, ScheduleManager};

fn router() -> Router {
    let store = Arc::new(RwLock::new(MemoryStore::new()));
    let manager = ScheduleManager::new(store);
    create_rest_router(manager, &RestApiConfig::default())
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_service(router: &Router) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/v1/services",
        Some(json!({ "name": "Consultation", "duration_minutes": 60, "price": "1500" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let app = router();
    let service_id = seed_service(&app).await;

    // Slot grid is ascending "HH:MM" with availability flags.
    let uri = format!("/api/v1/slots?date=2025-03-10&service_id={service_id}");
    let (status, slots) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let slots = slots.as_array().unwrap().clone();
    assert!(!slots.is_empty());
    assert_eq!(slots[0]["time"], "10:00");
    assert_eq!(slots[0]["available"], true);

    // Book the first slot.
    let (status, booking) = send(
        &app,
        Method::POST,
        "/api/v1/bookings",
        Some(json!({
            "name": "Anna",
            "phone": "+70000000000",
            "service_id": service_id,
            "date": "2025-03-10",
            "time": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["slot_time"], "10:00");
    let booking_id = booking["id"].as_str().unwrap();

    // Confirm it.
    let (status, confirmed) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/bookings/{booking_id}/status"),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");

    // The slot is gone from the grid.
    let (_, slots) = send(&app, Method::GET, &uri, None).await;
    let taken = slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == "10:00")
        .unwrap();
    assert_eq!(taken["available"], false);

    // An illegal lifecycle transition is a 400.
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/bookings/{booking_id}/status"),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_block_date_conflict_shape_and_force() {
    let app = router();
    let service_id = seed_service(&app).await;

    let (_, booking) = send(
        &app,
        Method::POST,
        "/api/v1/bookings",
        Some(json!({
            "name": "Anna",
            "phone": "+70000000000",
            "service_id": service_id,
            "date": "2025-03-10",
            "time": "12:00"
        })),
    )
    .await;
    let booking_id = booking["id"].as_str().unwrap();
    send(
        &app,
        Method::PUT,
        &format!("/api/v1/bookings/{booking_id}/status"),
        Some(json!({ "status": "confirmed" })),
    )
    .await;

    // Unforced block collides: 409 with the uniform conflict shape.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/blocked-dates",
        Some(json!({ "date": "2025-03-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflict"], true);
    assert!(body["message"].as_str().unwrap().contains("1 confirmed"));
    assert_eq!(body["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(body["bookings"][0]["client_name"], "Anna");

    // Forced block succeeds and cancels the booking.
    let (status, blocked) = send(
        &app,
        Method::POST,
        "/api/v1/blocked-dates",
        Some(json!({ "date": "2025-03-10", "force": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(blocked["date"], "2025-03-10");

    let (_, bookings) = send(&app, Method::GET, "/api/v1/bookings?date=2025-03-10", None).await;
    assert_eq!(bookings[0]["status"], "cancelled");

    // A blocked date yields an empty slot grid.
    let uri = format!("/api/v1/slots?date=2025-03-10&service_id={service_id}");
    let (status, slots) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(slots.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cycle_and_settings_endpoints() {
    let app = router();

    // Save a cycle and read it back.
    let (status, entries) = send(
        &app,
        Method::PUT,
        "/api/v1/schedule/2025-03-10",
        Some(json!({
            "days": [
                { "day_of_week": "monday", "week": 1,
                  "interval": { "start": "09:00", "end": "15:00" } }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let (_, listed) = send(&app, Method::GET, "/api/v1/schedule", None).await;
    assert_eq!(listed[0]["day_of_week"], "monday");
    assert_eq!(listed[0]["week"], 1);
    assert_eq!(listed[0]["cycle_start"], "2025-03-10");

    // Partial settings update leaves other fields alone.
    let (status, settings) = send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({ "prep_time": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["prep_time"], 15);
    assert_eq!(settings["work_start"], "10:00");

    // Delete the cycle.
    let (status, _) = send(&app, Method::DELETE, "/api/v1/schedule/2025-03-10", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = send(&app, Method::GET, "/api/v1/schedule", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_event_validation_and_unknown_ids() {
    let app = router();

    // Missing title is a 400 before anything is written.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/events",
        Some(json!({
            "title": "",
            "date": "2025-03-10",
            "start": "10:00",
            "end": "11:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_failed");

    // Unknown service on the slot grid is a 404.
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/slots?date=2025-03-10&service_id=nope",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    // Deleting a missing event is a 404.
    let (status, _) = send(&app, Method::DELETE, "/api/v1/events/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
