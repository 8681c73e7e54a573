use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use domain::DeviceStatus;
use http_body_util::BodyExt;
use plc_api::{build_router, AppState};
use plc_control::CommandService;
use plc_protocol::{SimulatedConnector, SimulatedRegisterDevice};
use plc_storage::{InMemoryMessageStore, InMemoryPlcStore, InMemoryReadingStore, PlcRecord, PlcStore};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    plc_store: Arc<InMemoryPlcStore>,
    connector: Arc<SimulatedConnector>,
    state: AppState,
}

fn test_app() -> TestApp {
    let plc_store = Arc::new(InMemoryPlcStore::new());
    let reading_store = Arc::new(InMemoryReadingStore::new());
    let message_store = Arc::new(InMemoryMessageStore::new());
    let connector = Arc::new(SimulatedConnector::new());
    let command_service = Arc::new(CommandService::new(plc_store.clone(), connector.clone()));
    let state = AppState {
        plc_store: plc_store.clone(),
        reading_store,
        message_store,
        command_service,
    };
    TestApp {
        plc_store,
        connector,
        state,
    }
}

fn router(app: &TestApp) -> Router {
    build_router(app.state.clone())
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

async fn seed_plcs(app: &TestApp, count: usize) {
    for index in 0..count {
        app.plc_store
            .create_plc(PlcRecord {
                plc_id: format!("PLC{:03}", index),
                ip_address: "10.0.0.1".to_string(),
                port: 502,
                unit_id: 1,
                status: DeviceStatus::Active,
                created_at_ms: 1_000 + index as i64,
            })
            .await
            .expect("seed");
    }
}

#[tokio::test]
async fn add_plc_succeeds_then_duplicate_conflicts() {
    let app = test_app();
    let body = serde_json::json!({
        "plc_id": "PLC1",
        "ip_address": "192.168.1.1",
        "port": 502,
        "unit_id": 1,
        "status": "active"
    });

    let (status, json) = send(
        router(&app),
        json_request(Method::POST, "/add-plc", body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "PLC added successfully");
    assert_eq!(json["data"]["plc_id"], "PLC1");

    let (status, json) = send(router(&app), json_request(Method::POST, "/add-plc", body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        json["message"],
        "A plc device with the same unique key already exists."
    );
}

#[tokio::test]
async fn add_plc_rejects_blank_required_fields() {
    let app = test_app();
    let body = serde_json::json!({
        "plc_id": "  ",
        "ip_address": "192.168.1.1",
        "port": 502
    });
    let (status, json) = send(router(&app), json_request(Method::POST, "/add-plc", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "plc_id is required");
}

#[tokio::test]
async fn update_plc_merges_only_provided_fields() {
    let app = test_app();
    seed_plcs(&app, 1).await;

    // 零值端口按"未提供"处理
    let body = serde_json::json!({ "ip_address": "10.0.0.9", "port": 0 });
    let (status, json) = send(
        router(&app),
        json_request(Method::PUT, "/update-plc/PLC000", body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Update data successfully");
    assert_eq!(json["data"]["ip_address"], "10.0.0.9");
    assert_eq!(json["data"]["port"], 502);

    let (status, json) = send(
        router(&app),
        json_request(Method::PUT, "/update-plc/PLC000", serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "empty update");

    let (status, json) = send(
        router(&app),
        json_request(
            Method::PUT,
            "/update-plc/PLC999",
            serde_json::json!({ "ip_address": "10.0.0.2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "PLC record not found");
}

#[tokio::test]
async fn delete_plc_then_absence_is_not_found() {
    let app = test_app();
    seed_plcs(&app, 1).await;

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/delete-plc/PLC000")
        .body(Body::empty())
        .expect("request");
    let (status, json) = send(router(&app), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "PLC deleted successfully");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/delete-plc/PLC000")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(router(&app), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_all_plcs_returns_paginated_envelope() {
    let app = test_app();
    seed_plcs(&app, 25).await;

    let (status, json) = send(
        router(&app),
        get_request("/get-all-plcs?page=2&limit=10&search=PLC"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Plc list fetched successfully");
    let page = &json["data"];
    assert_eq!(page["total_items"], 25);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["items"].as_array().expect("items").len(), 10);
    assert_eq!(
        page["next_page_url"],
        "/get-all-plcs?search=PLC&page=3&limit=10"
    );
    assert_eq!(
        page["previous_page_url"],
        "/get-all-plcs?search=PLC&page=1&limit=10"
    );
}

#[tokio::test]
async fn get_all_plcs_without_pagination_returns_full_list() {
    let app = test_app();
    seed_plcs(&app, 7).await;

    let (status, json) = send(
        router(&app),
        get_request("/get-all-plcs?is_pagination=false"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().expect("list").len(), 7);
}

#[tokio::test]
async fn pagination_bounds_are_rejected() {
    let app = test_app();

    let (status, _) = send(router(&app), get_request("/get-all-plcs?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(router(&app), get_request("/get-all-plcs?limit=101")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"]
        .as_str()
        .expect("message")
        .contains("limit"));
}

#[tokio::test]
async fn oversized_date_range_is_rejected_before_any_query() {
    let app = test_app();
    let (status, json) = send(
        router(&app),
        get_request("/get-all-plcs?from_date=2026-01-01&to_date=2026-05-01"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"]
        .as_str()
        .expect("message")
        .contains("date range"));

    let (status, _) = send(
        router(&app),
        get_request("/get-all-plcs?from_date=not-a-date"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_command_round_trips_to_the_device() {
    let app = test_app();
    seed_plcs(&app, 1).await;
    let endpoint = app
        .plc_store
        .find_plc("PLC000")
        .await
        .expect("query")
        .expect("seeded")
        .endpoint();
    app.connector
        .register_device(&endpoint, SimulatedRegisterDevice::new(4));

    let body = serde_json::json!({ "plc_id": "PLC000", "register_address": 2, "value": 77 });
    let (status, json) = send(router(&app), json_request(Method::POST, "/send-command", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Write successful");

    let device = app.connector.device(&endpoint).expect("device");
    assert_eq!(device.snapshot(), vec![0, 0, 77, 0]);
}

#[tokio::test]
async fn send_command_maps_failures_to_client_errors() {
    let app = test_app();
    seed_plcs(&app, 1).await;
    let endpoint = app
        .plc_store
        .find_plc("PLC000")
        .await
        .expect("query")
        .expect("seeded")
        .endpoint();
    app.connector
        .register_device(&endpoint, SimulatedRegisterDevice::new(4));
    app.connector.set_unreachable(&endpoint);

    let body = serde_json::json!({ "plc_id": "PLC000", "register_address": 0, "value": 1 });
    let (status, json) = send(router(&app), json_request(Method::POST, "/send-command", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"]
        .as_str()
        .expect("message")
        .contains("connection"));

    let body = serde_json::json!({ "plc_id": "PLC999", "register_address": 0, "value": 1 });
    let (status, json) = send(router(&app), json_request(Method::POST, "/send-command", body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "PLC record not found");
}

#[tokio::test]
async fn health_and_metrics_respond() {
    let app = test_app();

    let (status, json) = send(router(&app), get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);

    let (status, json) = send(router(&app), get_request("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["sweeps_completed"].is_u64());
}
