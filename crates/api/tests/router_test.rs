//! Router tests driving the full axum app with `oneshot`.
//!
//! Every request here is rejected or answered before the database is touched.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use ledgerlens_api::{AppState, create_router};
use ledgerlens_shared::config::ReportConfig;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    create_router(AppState {
        db: Arc::new(DatabaseConnection::Disconnected),
        report: Arc::new(ReportConfig::default()),
    })
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "ledgerlens-api");
}

#[tokio::test]
async fn test_general_ledger_rejects_malformed_id_list() {
    let uri = format!(
        "/api/v1/companies/{}/reports/general-ledger?journals=abc",
        Uuid::now_v7()
    );
    let (status, body) = get(&uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_financial_report_rejects_reversed_dates() {
    let uri = format!(
        "/api/v1/companies/{}/reports/financial/Balance%20Sheet?date_from=2024-03-01&date_to=2024-01-31",
        Uuid::now_v7()
    );
    let (status, body) = get(&uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_export_rejects_unknown_target_move() {
    let uri = format!(
        "/api/v1/companies/{}/reports/financial/Balance%20Sheet/export?target_move=archived",
        Uuid::now_v7()
    );
    let (status, _) = get(&uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_company_id_is_rejected() {
    let (status, _) = get("/api/v1/companies/not-a-uuid/reports/general-ledger").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get("/api/v1/companies").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
