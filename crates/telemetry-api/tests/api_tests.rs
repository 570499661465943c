//! Integration tests for the telemetry API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, backed by the in-memory record store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use telemetry_api::build_router;
use telemetry_api::state::AppState;
use telemetry_core::{spawn_fanout, Ingestor, MemoryStore, RecordStore, TimeFormatter};
use telemetry_types::Report;
use tower::ServiceExt;

fn report_json(speed: i64) -> Value {
    json!({
        "car": {
            "gps": {"latitude": -23.5586, "longitude": -46.6492},
            "imu": {
                "accelerationX": 1, "accelerationY": -2, "accelerationZ": 64,
                "spinX": 0, "spinY": 0, "spinZ": -3,
                "scale_dps": 250
            },
            "drive": {"pwm": 120, "speed_est_mps": 3.5}
        },
        "centric": {"controls": {"curve_direction": 270, "speed": speed, "movement_direction": 1}},
        "src": "api-test"
    })
}

fn make_test_state() -> Arc<AppState<MemoryStore>> {
    let (fanout, _task) = spawn_fanout();
    let ingestor = Ingestor::new(
        Arc::new(MemoryStore::new()),
        12.0,
        TimeFormatter::new("America/Sao_Paulo"),
    );
    Arc::new(AppState::new(ingestor, fanout))
}

fn router(state: &Arc<AppState<MemoryStore>>) -> Router {
    build_router(Arc::clone(state), &[])
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: &Arc<AppState<MemoryStore>>, uri: &str) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post_ingest(state: &Arc<AppState<MemoryStore>>, body: String) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(
            Request::post("/api/v1/telemetry/ingest")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn seed(state: &Arc<AppState<MemoryStore>>, stamps: &[i64]) {
    for &ts in stamps {
        let report: Report = serde_json::from_value(report_json(100)).unwrap();
        state.ingestor.ingest_at(&report, ts).await.unwrap();
    }
}

fn stamps(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|d| d["ts"].as_i64().unwrap())
        .collect()
}

// =========================================================================
// Probes
// =========================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let state = make_test_state();
    assert_eq!(get(&state, "/health").await, (StatusCode::OK, json!({"status": "ok"})));
    assert_eq!(get(&state, "/ready").await, (StatusCode::OK, json!({"status": "ready"})));
}

// =========================================================================
// Ingest
// =========================================================================

#[tokio::test]
async fn test_ingest_returns_processed_document() {
    let state = make_test_state();
    let (status, doc) = post_ingest(&state, report_json(255).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["src"], "api-test");
    assert!(doc["ts"].as_i64().unwrap() > 0);
    assert!(doc["ts_iso"].as_str().unwrap().ends_with('Z'));
    assert!(doc["ts_local"].as_str().unwrap().ends_with("-03:00"));

    let controls = &doc["centric"]["controls"];
    assert_eq!(controls["curve_direction"], 270);
    assert_eq!(controls["derived"]["steering_deg"], -90.0);
    assert_eq!(controls["derived"]["steering_side"], "left");
    assert_eq!(controls["derived"]["speed_cmd_mps"], 12.0);
    assert_eq!(controls["derived"]["movement_direction_text"], "front");
    assert_eq!(doc["car"]["imu"]["accelerationZ"], 64);

    assert_eq!(state.store().counts().await, (1, 1));
}

#[tokio::test]
async fn test_ingest_defaults_source() {
    let state = make_test_state();
    let mut body = report_json(10);
    body.as_object_mut().unwrap().remove("src");

    let (status, doc) = post_ingest(&state, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["src"], "central");
}

#[tokio::test]
async fn test_ingest_rejects_out_of_range_without_writing() {
    let state = make_test_state();
    let (status, body) = post_ingest(&state, report_json(256).to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert_eq!(state.store().counts().await, (0, 0));
}

#[tokio::test]
async fn test_ingest_rejects_malformed_json() {
    let state = make_test_state();
    let (status, _) = post_ingest(&state, String::from("{\"car\":")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.store().counts().await, (0, 0));
}

#[tokio::test]
async fn test_ingest_broadcasts_to_subscribers() {
    let state = make_test_state();
    let mut subscription = state.fanout.connect().unwrap();

    let (_, doc) = post_ingest(&state, report_json(50).to_string()).await;

    let frame = subscription.rx.recv().await.unwrap();
    let pushed: Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(pushed, doc);
}

// =========================================================================
// Processed queries
// =========================================================================

#[tokio::test]
async fn test_latest_is_null_when_empty() {
    let state = make_test_state();
    assert_eq!(
        get(&state, "/api/v1/telemetry/latest").await,
        (StatusCode::OK, Value::Null)
    );
}

#[tokio::test]
async fn test_latest_follows_touch() {
    let state = make_test_state();
    seed(&state, &[10, 20, 30]).await;

    let (_, latest) = get(&state, "/api/v1/telemetry/latest").await;
    assert_eq!(latest["ts"], 30);

    let oldest = state
        .store()
        .range(&telemetry_types::RangeQuery {
            order_by: telemetry_types::OrderBy::Ts,
            ..telemetry_types::RangeQuery::default()
        })
        .await
        .unwrap()
        .pop()
        .unwrap();
    assert!(state.store().touch(oldest.id, 1_000).await.unwrap());

    let (_, latest) = get(&state, "/api/v1/telemetry/latest").await;
    assert_eq!(latest["ts"], 10);
}

#[tokio::test]
async fn test_list_orders_and_pages() {
    let state = make_test_state();
    seed(&state, &[10, 20, 30]).await;

    let (status, list) = get(&state, "/api/v1/telemetry/list?limit=2&order_by=ts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stamps(&list), vec![30, 20]);

    let (_, list) = get(&state, "/api/v1/telemetry/list?limit=2&offset=2&order_by=ts").await;
    assert_eq!(stamps(&list), vec![10]);
}

#[tokio::test]
async fn test_list_filters_on_ts_bounds() {
    let state = make_test_state();
    seed(&state, &[10, 20, 30]).await;

    for order in ["ts", "updated_at"] {
        let uri = format!("/api/v1/telemetry/list?start_ts=15&end_ts=25&order_by={order}");
        let (_, list) = get(&state, &uri).await;
        assert_eq!(stamps(&list), vec![20], "order_by={order}");
    }
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let state = make_test_state();
    for uri in [
        "/api/v1/telemetry/list?limit=0",
        "/api/v1/telemetry/list?limit=1001",
        "/api/v1/telemetry/list?order_by=speed",
        "/api/v1/telemetry/list?offset=-1",
        "/api/v1/telemetry/raw/list?limit=5000",
    ] {
        let (status, body) = get(&state, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], 400, "{uri}");
    }
}

// =========================================================================
// Raw queries
// =========================================================================

#[tokio::test]
async fn test_raw_latest_shape() {
    let state = make_test_state();
    assert_eq!(
        get(&state, "/api/v1/telemetry/raw/latest").await,
        (StatusCode::OK, Value::Null)
    );

    seed(&state, &[42]).await;
    let (status, raw) = get(&state, "/api/v1/telemetry/raw/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(raw["received_at"], 42);
    assert_eq!(raw["src"], "api-test");
    assert_eq!(raw["raw"]["centric"]["controls"]["speed"], 100);
    assert!(raw["raw"].get("ts").is_none());
}

#[tokio::test]
async fn test_raw_list_filters_on_received_at() {
    let state = make_test_state();
    seed(&state, &[100, 200, 300]).await;

    let (status, list) = get(
        &state,
        "/api/v1/telemetry/raw/list?start_received_at=150&end_received_at=300",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let received: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["received_at"].as_i64().unwrap())
        .collect();
    assert_eq!(received, vec![300, 200]);
}
