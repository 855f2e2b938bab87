//! Integration tests for the host API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use carousel_core::carousel::CarouselEngine;
use carousel_core::config::{SimulationBoundsConfig, SimulationConfig};
use carousel_core::ids::SequentialIds;
use carousel_core::operator::OperatorState;
use carousel_core::runner::{SharedSession, share};
use carousel_core::session::CarouselSession;
use carousel_core::spawn::FixedDelay;
use carousel_core::storage::StorageManager;
use carousel_observer::router::build_router;
use carousel_observer::state::AppState;
use carousel_types::ItemId;
use serde_json::{Value, json};
use tower::ServiceExt;

fn make_session() -> SharedSession {
    let config = SimulationConfig::default();
    share(CarouselSession::new(
        CarouselEngine::new(
            &config.carousel,
            Box::new(SequentialIds::new("luggage")),
            Box::new(FixedDelay(100.0)),
        ),
        StorageManager::new(&config.storage),
    ))
}

fn make_state() -> Arc<AppState> {
    Arc::new(AppState::new(make_session()))
}

fn make_state_with_operator() -> (Arc<AppState>, Arc<OperatorState>) {
    let operator = Arc::new(OperatorState::new(16, &SimulationBoundsConfig::default()));
    let state = Arc::new(AppState::with_operator(make_session(), Arc::clone(&operator)));
    (state, operator)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post(router: &Router, path: &str, body: &Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

/// Tick at 16ms frames from `start` until an item is on the track; returns
/// the last host time used.
async fn tick_until_item(router: &Router, start: f64) -> f64 {
    let mut now = start;
    loop {
        now += 16.0;
        let (status, _) = post(router, "/api/tick", &json!({ "now_ms": now })).await;
        assert_eq!(status, StatusCode::OK);
        let (_, track) = get(router, "/api/track").await;
        if !track["items"].as_array().unwrap().is_empty() {
            return now;
        }
    }
}

async fn first_item(router: &Router) -> Value {
    let (_, track) = get(router, "/api/track").await;
    track["items"][0].clone()
}

// =========================================================================
// Track
// =========================================================================

#[tokio::test]
async fn test_track_starts_empty() {
    let router = build_router(make_state());
    let (status, json) = get(&router, "/api/track").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tick"], 0);
    assert_eq!(json["items"], json!([]));
    assert_eq!(json["reduced_motion"], false);
}

#[tokio::test]
async fn test_set_width_and_motion() {
    let router = build_router(make_state());

    let (status, json) = post(&router, "/api/track/width", &json!({ "width": 1024.0 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["track_width"], 1024.0);
    assert_eq!(json["cull_threshold"], 1124.0);

    let (status, json) = post(&router, "/api/track/motion", &json!({ "reduced_motion": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reduced_motion"], true);
}

#[tokio::test]
async fn test_tick_spawns_after_delay() {
    let router = build_router(make_state());

    let (_, early) = post(&router, "/api/tick", &json!({ "now_ms": 50.0 })).await;
    assert_eq!(early["tick"], 1);
    assert!(early["spawned"].is_null());

    let (_, later) = post(&router, "/api/tick", &json!({ "now_ms": 150.0 })).await;
    assert_eq!(later["tick"], 2);
    assert_eq!(later["spawned"], "luggage-1");
    assert_eq!(later["in_flight"], 1);
}

#[tokio::test]
async fn test_malformed_tick_is_rejected() {
    let router = build_router(make_state());
    let response = router
        .oneshot(
            Request::post("/api/tick")
                .header("content-type", "application/json")
                .body(Body::from("{\"now_ms\":"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

// =========================================================================
// Drag, drop, unload
// =========================================================================

#[tokio::test]
async fn test_drag_unknown_item_is_not_accepted() {
    let router = build_router(make_state());
    let (status, json) = post(&router, "/api/drag/start", &json!({ "item_id": "luggage-9" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], false);
}

#[tokio::test]
async fn test_drag_and_drop_stores_item() {
    let router = build_router(make_state());
    tick_until_item(&router, 0.0).await;
    let item = first_item(&router).await;

    let (_, drag) = post(&router, "/api/drag/start", &json!({ "item_id": item["id"] })).await;
    assert_eq!(drag["accepted"], true);

    let (status, drop) = post(&router, "/api/drop", &json!({ "cell_id": "cell-4" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drop["placed"], true);
    assert_eq!(drop["seq"], 1);
    assert!(drop["rejection"].is_null());

    let (_, track) = get(&router, "/api/track").await;
    assert_eq!(track["items"], json!([]));

    let (_, grid) = get(&router, "/api/grid").await;
    assert_eq!(grid["has_any_occupant"], true);
    assert_eq!(grid["cells"][4]["occupant"]["id"], item["id"]);
    assert_eq!(grid["cells"][4]["is_priority"], false);
}

#[tokio::test]
async fn test_drop_without_drag_is_a_no_op() {
    let router = build_router(make_state());
    let (status, json) = post(&router, "/api/drop", &json!({ "cell_id": "cell-0" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["placed"], false);
    assert_eq!(json["rejection"], "nothing_dragged");
}

#[tokio::test]
async fn test_drop_on_unknown_cell_keeps_item() {
    let router = build_router(make_state());
    tick_until_item(&router, 0.0).await;
    let item = first_item(&router).await;

    let (status, json) = post(
        &router,
        "/api/drop",
        &json!({ "cell_id": "cell-99", "item": item }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["placed"], false);
    assert_eq!(json["rejection"], "unknown_cell");

    let (_, track) = get(&router, "/api/track").await;
    assert_eq!(track["items"][0]["id"], item["id"]);
}

#[tokio::test]
async fn test_unload_empty_returns_null() {
    let router = build_router(make_state());
    let (status, json) = post(&router, "/api/unload", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["unloaded"].is_null());
    assert_eq!(json["has_any_occupant"], false);
}

#[tokio::test]
async fn test_end_to_end_unload_order() {
    let router = build_router(make_state());
    let mut now = 0.0;
    let mut names = Vec::new();

    for cell in ["cell-0", "cell-1", "cell-3"] {
        now = tick_until_item(&router, now).await;
        let item = first_item(&router).await;
        names.push(item["id"].clone());
        let (_, drop) = post(&router, "/api/drop", &json!({ "cell_id": cell, "item": item })).await;
        assert_eq!(drop["placed"], true);
    }

    let mut order = Vec::new();
    let mut tiers = Vec::new();
    loop {
        let (_, json) = post(&router, "/api/unload", &json!({})).await;
        if json["unloaded"].is_null() {
            break;
        }
        order.push(json["unloaded"]["item"]["id"].clone());
        tiers.push(json["unloaded"]["tier"].clone());
    }

    // A (cell-0), B (cell-1), C (cell-3) unload as B, A, C.
    let [a, b, c] = <[Value; 3]>::try_from(names).unwrap();
    assert_eq!(order, vec![b, a, c]);
    assert_eq!(tiers, vec![json!("priority"), json!("priority"), json!("regular")]);
}

// =========================================================================
// Event interface
// =========================================================================

#[tokio::test]
async fn test_event_endpoint_applies_host_events() {
    let router = build_router(make_state());

    let (status, json) = post(&router, "/api/events", &json!({ "type": "tick", "now_ms": 500.0 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "ticked");
    assert_eq!(json["spawned"], "luggage-1");

    let (_, json) = post(
        &router,
        "/api/events",
        &json!({ "type": "start_drag", "item_id": "luggage-1" }),
    )
    .await;
    assert_eq!(json, json!({ "type": "drag_started", "accepted": true }));

    let (_, json) = post(
        &router,
        "/api/events",
        &json!({ "type": "drop_on_cell", "cell_id": "cell-2", "item": null }),
    )
    .await;
    assert_eq!(json["type"], "dropped");
    assert_eq!(json["placed"], true);

    let (_, json) = post(&router, "/api/events", &json!({ "type": "request_unload" })).await;
    assert_eq!(json["type"], "unloaded");
    assert_eq!(json["unloaded"]["cell_id"], "cell-2");
}

#[tokio::test]
async fn test_tick_is_broadcast_to_subscribers() {
    let state = make_state();
    let mut rx = state.subscribe();
    let router = build_router(Arc::clone(&state));

    let _ = post(&router, "/api/tick", &json!({ "now_ms": 500.0 })).await;

    let frame = rx.recv().await.unwrap();
    assert_eq!(frame.tick, 1);
    assert_eq!(frame.items.len(), 1);
    assert_eq!(frame.spawned.as_ref().map(ItemId::as_str), Some("luggage-1"));
}

// =========================================================================
// Operator
// =========================================================================

#[tokio::test]
async fn test_operator_endpoints_need_operator_state() {
    let router = build_router(make_state());
    let (status, json) = post(&router, "/api/operator/pause", &json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn test_operator_pause_resume_stop() {
    let (state, operator) = make_state_with_operator();
    let router = build_router(state);

    let (status, _) = post(&router, "/api/operator/pause", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(operator.is_paused());

    let (_, status_json) = get(&router, "/api/operator/status").await;
    assert_eq!(status_json["paused"], true);
    assert_eq!(status_json["tick"], 0);
    assert_eq!(status_json["stored"], 0);

    let _ = post(&router, "/api/operator/resume", &json!({})).await;
    assert!(!operator.is_paused());

    let _ = post(&router, "/api/operator/stop", &json!({})).await;
    assert!(operator.is_stop_requested());
}

#[tokio::test]
async fn test_host_ticks_refused_while_engine_drives() {
    let (state, _operator) = make_state_with_operator();
    let router = build_router(state);

    let (status, json) = post(&router, "/api/tick", &json!({ "now_ms": 1_000_000.0 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["status"], 409);

    let (status, _) = post(
        &router,
        "/api/events",
        &json!({ "type": "tick", "now_ms": 1_000_000.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, track) = get(&router, "/api/track").await;
    assert_eq!(track["tick"], 0);

    // Non-tick host operations still apply.
    let (status, json) = post(&router, "/api/events", &json!({ "type": "request_unload" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "unloaded");
}

#[tokio::test]
async fn test_operator_speed_bounds() {
    let (state, operator) = make_state_with_operator();
    let router = build_router(state);

    let (status, json) = post(&router, "/api/operator/speed", &json!({ "tick_interval_ms": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert_eq!(operator.tick_interval_ms(), 16);

    let (status, json) = post(&router, "/api/operator/speed", &json!({ "tick_interval_ms": 40 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["previous_interval_ms"], 16);
    assert_eq!(operator.tick_interval_ms(), 40);
}
