// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use product_holmes::analyze::model_client::{MockClient, MOCK_PAYLOAD};
use product_holmes::config::PlanTable;
use product_holmes::{router, AnalyzeError, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

fn app_with(client: MockClient) -> (Router, AppState) {
    let state = AppState::new(Arc::new(client), PlanTable::default());
    (router(state.clone()), state)
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = app_with(MockClient::payload(MOCK_PAYLOAD));
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn analyze_returns_issues_and_severity() {
    let (app, state) = app_with(MockClient::payload(MOCK_PAYLOAD));
    let (status, bytes) = post_json(app, "/analyze", json!({ "product": "Phone", "plan": "Pro" })).await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v["product"], "Phone");
    assert_eq!(v["plan"], "pro");
    assert_eq!(v["mode"], "structured");
    assert_eq!(v["issues"].as_array().map(Vec::len), Some(3));
    assert_eq!(v["severity"]["critical"], 1);
    assert_eq!(v["severity"]["medium"], 1);
    assert_eq!(v["severity"]["minor"], 1);
    let first = &v["issues"][0];
    assert!(first["id"].is_string());
    assert!(first["totalOccurrences"].as_u64().unwrap() >= 1);
    assert!(first["lastDetected"].is_string());

    // The analysis is remembered for the history panel.
    let hist = state.history.snapshot_last_n(5);
    assert_eq!(hist.len(), 1);
    assert_eq!(hist[0].issue_count, 3);
}

#[tokio::test]
async fn analyze_error_kinds_map_to_status_codes() {
    let cases = [
        (MockClient::payload(MOCK_PAYLOAD), json!({ "product": "  " }), StatusCode::BAD_REQUEST, "validation"),
        (MockClient::payload(r#"{"error":"rate limited"}"#), json!({ "product": "P" }), StatusCode::BAD_GATEWAY, "upstream"),
        (MockClient::payload("   "), json!({ "product": "P" }), StatusCode::UNPROCESSABLE_ENTITY, "format"),
        (
            MockClient::failing(AnalyzeError::Transport("down".into())),
            json!({ "product": "P" }),
            StatusCode::SERVICE_UNAVAILABLE,
            "transport",
        ),
    ];
    for (client, payload, expected, kind) in cases {
        let (app, _) = app_with(client);
        let (status, bytes) = post_json(app, "/analyze", payload).await;
        assert_eq!(status, expected, "{kind}");
        let v: Json = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(v["kind"], kind);
        assert!(v["error"].is_string());
    }
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let (app, _) = app_with(MockClient::payload(MOCK_PAYLOAD));
    let issues = json!([
        {
            "id": "ai_1_0", "description": "Crashes on launch", "category": "General Feedback",
            "sources": [], "occurrenceDetails": {}, "totalOccurrences": 1,
            "lastDetected": "2025-01-02T00:00:00Z"
        },
        {
            "id": "ai_1_1", "description": "Slow startup", "category": "General Feedback",
            "totalOccurrences": 1, "lastDetected": "2025-01-02T00:00:00Z"
        }
    ]);
    let req = Request::builder()
        .method("POST")
        .uri("/export")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "product": "My Phone", "issues": issues }).to_string()))
        .expect("build POST /export");
    let resp = app.oneshot(req).await.expect("oneshot /export");
    assert_eq!(resp.status(), StatusCode::OK);

    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("issues-my-phone.csv"), "{disposition}");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    let csv = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert_eq!(csv, "id,issue\n1,Crashes on launch\n2,Slow startup\n");
}

#[tokio::test]
async fn history_lists_recent_analyses() {
    let (app, _) = app_with(MockClient::payload("1. Lag\n2. lag"));
    let (status, _) = post_json(app.clone(), "/analyze", json!({ "product": "A" })).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .uri("/history?limit=5")
        .body(Body::empty())
        .expect("build GET /history");
    let resp = app.oneshot(req).await.expect("oneshot /history");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v[0]["product"], "A");
    assert_eq!(v[0]["issue_count"], 1);
    assert_eq!(v[0]["mode"], "plain_text");
}
