use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::workflows::analysis::requester::{
    GeneratedReport, GenerationFailure, GenerationRequest, ReportRequester,
};
use crate::workflows::analysis::store::{ReportStore, StoreFailure, StoredReport};
use crate::workflows::analysis::{
    AnalysisRequest, InvestmentAnalysisService, MarkdownArchive,
};
use crate::workflows::financials::{AcquisitionFailure, Grid, TableAcquirer};

pub(super) fn quarterly_grid() -> Grid {
    Grid::from_text_rows(vec![
        vec!["주요재무정보", "2023.12", "2024.12", "2025.12(E)"],
        vec!["", "IFRS연결", "IFRS연결", "IFRS연결"],
        vec!["매출액", "2,589,355", "3,008,709", "3,201,000"],
        vec!["영업이익", "65,670", "327,260", ""],
        vec!["ROE(%)", "4.15", "9.03", "10.2"],
    ])
}

pub(super) fn generated_report() -> GeneratedReport {
    GeneratedReport {
        text: "# 삼성전자 투자 보고서".to_string(),
        citations: vec!["https://dart.fss.or.kr".to_string()],
        model: "sonar-pro".to_string(),
        usage: json!({ "total_tokens": 2048 }),
        created: 1_760_000_000,
    }
}

pub(super) fn analysis_request(market: Option<&str>) -> AnalysisRequest {
    AnalysisRequest {
        stock_code: "005930".to_string(),
        stock_name: "삼성전자".to_string(),
        compare_periods: vec!["2023.12".to_string(), "2024.12".to_string()],
        api_key: "pplx-test".to_string(),
        model: None,
        market: market.map(str::to_string),
    }
}

pub(super) type TestService = InvestmentAnalysisService<StubAcquirer, StubRequester, MemoryStore>;

pub(super) struct Harness {
    pub(super) service: TestService,
    pub(super) acquirer: Arc<StubAcquirer>,
    pub(super) requester: Arc<StubRequester>,
    pub(super) store: Arc<MemoryStore>,
}

pub(super) fn harness(
    acquired: Result<Grid, AcquisitionFailure>,
    generated: Result<GeneratedReport, GenerationFailure>,
) -> Harness {
    let acquirer = Arc::new(StubAcquirer::new(acquired));
    let requester = Arc::new(StubRequester::new(generated));
    let store = Arc::new(MemoryStore::default());
    let service = InvestmentAnalysisService::new(
        acquirer.clone(),
        requester.clone(),
        store.clone(),
        MarkdownArchive::disabled(),
    );
    Harness {
        service,
        acquirer,
        requester,
        store,
    }
}

pub(super) fn default_harness() -> Harness {
    harness(Ok(quarterly_grid()), Ok(generated_report()))
}

pub(super) struct StubAcquirer {
    result: Result<Grid, AcquisitionFailure>,
    calls: Mutex<Vec<String>>,
}

impl StubAcquirer {
    pub(super) fn new(result: Result<Grid, AcquisitionFailure>) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("acquirer mutex poisoned").clone()
    }
}

#[async_trait]
impl TableAcquirer for StubAcquirer {
    async fn fetch(&self, stock_code: &str) -> Result<Grid, AcquisitionFailure> {
        self.calls
            .lock()
            .expect("acquirer mutex poisoned")
            .push(stock_code.to_string());
        self.result.clone()
    }
}

pub(super) struct StubRequester {
    result: Result<GeneratedReport, GenerationFailure>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubRequester {
    pub(super) fn new(result: Result<GeneratedReport, GenerationFailure>) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .expect("requester mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl ReportRequester for StubRequester {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedReport, GenerationFailure> {
        self.requests
            .lock()
            .expect("requester mutex poisoned")
            .push(request);
        self.result.clone()
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    reports: Mutex<Vec<StoredReport>>,
}

impl MemoryStore {
    pub(super) fn reports(&self) -> Vec<StoredReport> {
        self.reports.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn store(&self, report: StoredReport) -> Result<(), StoreFailure> {
        self.reports
            .lock()
            .expect("store mutex poisoned")
            .push(report);
        Ok(())
    }
}

pub(super) struct OfflineStore;

#[async_trait]
impl ReportStore for OfflineStore {
    async fn store(&self, _report: StoredReport) -> Result<(), StoreFailure> {
        Err(StoreFailure::Transport("connection refused".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
