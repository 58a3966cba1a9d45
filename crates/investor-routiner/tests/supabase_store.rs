use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use investor_routiner::config::StoreConfig;
use investor_routiner::workflows::analysis::{
    Market, ReportFields, ReportStore, StoreFailure, StoredReport, SupabaseReportStore,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Inserts {
    rows: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn insert_report(
    State(inserts): State<Inserts>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    inserts
        .rows
        .lock()
        .expect("insert mutex poisoned")
        .push((headers, body));
    StatusCode::CREATED
}

async fn reject_report() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid API key" })),
    )
}

async fn spawn_postgrest(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });
    addr
}

fn report() -> StoredReport {
    StoredReport::new(
        Market::Overseas,
        "AAPL",
        "Apple",
        ReportFields {
            analysis: "## Apple".to_string(),
            financial_table: "| 지표 |\n| :--- |\n".to_string(),
            citations: vec!["https://investor.apple.com".to_string()],
            model: "sonar-pro".to_string(),
            usage: json!({ "total_tokens": 10 }),
            created: 1_760_000_000,
        },
    )
}

fn config(addr: SocketAddr) -> StoreConfig {
    StoreConfig {
        url: format!("http://{addr}"),
        service_role_key: "service-role-key".to_string(),
    }
}

#[tokio::test]
async fn inserts_report_row_with_service_role_headers() {
    let inserts = Inserts::default();
    let app = Router::new()
        .route("/rest/v1/reports", post(insert_report))
        .with_state(inserts.clone());
    let addr = spawn_postgrest(app).await;

    let store = SupabaseReportStore::new(Some(&config(addr))).expect("client builds");
    store.store(report()).await.expect("insert succeeds");

    let rows = inserts.rows.lock().expect("insert mutex poisoned").clone();
    assert_eq!(rows.len(), 1);
    let (headers, body) = &rows[0];
    assert_eq!(headers["apikey"], "service-role-key");
    assert_eq!(headers["authorization"], "Bearer service-role-key");
    assert_eq!(headers["prefer"], "return=minimal");

    assert_eq!(body["market"], "NASDAQ");
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["name"], "Apple");
    assert_eq!(body["sector"], Value::Null);
    assert_eq!(body["report"]["analysis"], "## Apple");
    assert_eq!(body["report"]["created"], 1_760_000_000);
}

#[tokio::test]
async fn rejected_insert_carries_status_and_body() {
    let app = Router::new().route("/rest/v1/reports", post(reject_report));
    let addr = spawn_postgrest(app).await;

    let store = SupabaseReportStore::new(Some(&config(addr))).expect("client builds");
    let failure = store.store(report()).await.expect_err("insert rejected");

    match failure {
        StoreFailure::Rejected { status, detail } => {
            assert_eq!(status, 401);
            assert!(detail.contains("Invalid API key"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}
