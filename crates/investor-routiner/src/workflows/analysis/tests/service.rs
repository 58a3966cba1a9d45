use super::common::*;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::workflows::analysis::{
    AnalysisServiceError, FinancialRequest, GenerationFailure, InvestmentAnalysisService,
    MarkdownArchive, Market, SaveMarkdownRequest,
};
use crate::workflows::financials::{AcquisitionFailure, MetricValue};

#[tokio::test]
async fn crawl_returns_one_record_per_period() {
    let harness = default_harness();
    let response = harness
        .service
        .crawl(FinancialRequest {
            stock_code: "005930".to_string(),
            compare_periods: vec!["2023.12".to_string(), "2024.12".to_string()],
            stock_name: Some("삼성전자".to_string()),
        })
        .await
        .expect("crawl succeeds");

    assert_eq!(response.financial_data.len(), 2);
    assert_eq!(
        response.financial_data[0].get("2023.12 - 매출액"),
        Some(&MetricValue::Integer(2_589_355))
    );
    assert_eq!(
        response.financial_data[1].get("2024.12 - ROE(%)"),
        Some(&MetricValue::Float(9.03))
    );
    assert!(response.csv_path.is_none());
    assert_eq!(harness.acquirer.calls(), vec!["005930".to_string()]);
}

#[tokio::test]
async fn crawl_without_periods_reports_no_data() {
    let harness = default_harness();
    let error = harness
        .service
        .crawl(FinancialRequest {
            stock_code: "005930".to_string(),
            compare_periods: Vec::new(),
            stock_name: None,
        })
        .await
        .expect_err("no periods requested");

    assert!(matches!(error, AnalysisServiceError::NoFinancialData { .. }));
    assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crawl_writes_csv_copy_when_export_configured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let acquirer = Arc::new(StubAcquirer::new(Ok(quarterly_grid())));
    let service = InvestmentAnalysisService::new(
        acquirer,
        Arc::new(StubRequester::new(Ok(generated_report()))),
        Arc::new(MemoryStore::default()),
        MarkdownArchive::disabled(),
    )
    .with_export_dir(Some(dir.path().to_path_buf()));

    let response = service
        .crawl(FinancialRequest {
            stock_code: "005930".to_string(),
            compare_periods: vec!["2024.12".to_string()],
            stock_name: None,
        })
        .await
        .expect("crawl succeeds");

    let expected = dir.path().join("005930_financials.csv");
    assert_eq!(response.csv_path, Some(expected.display().to_string()));
    assert!(expected.exists());
}

#[tokio::test]
async fn analyze_passes_records_and_context_to_requester() {
    let harness = default_harness();
    let response = harness
        .service
        .analyze(analysis_request(None), None)
        .await
        .expect("analysis succeeds");

    assert_eq!(response.analysis, "# 삼성전자 투자 보고서");
    assert_eq!(response.model, "sonar-pro");
    assert!(response.financial_table.starts_with("| 지표 | 2023.12 | 2024.12 |"));
    assert!(response.financial_table.contains("| 매출액 | 2589355 | 3008709 |"));

    let requests = harness.requester.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.subject_name, "삼성전자");
    assert_eq!(request.records.len(), 2);
    assert_eq!(request.context.market, Market::Domestic);
    assert_eq!(request.context.stock_code, "005930");
    assert!(request.context.model.is_none());
}

#[tokio::test]
async fn analyze_query_model_overrides_body_model() {
    let harness = default_harness();
    let mut request = analysis_request(None);
    request.model = Some("sonar".to_string());

    harness
        .service
        .analyze(request.clone(), Some("sonar-reasoning".to_string()))
        .await
        .expect("analysis succeeds");
    harness
        .service
        .analyze(request, Some("  ".to_string()))
        .await
        .expect("analysis succeeds");

    let models: Vec<_> = harness
        .requester
        .requests()
        .into_iter()
        .map(|request| request.context.model)
        .collect();
    assert_eq!(
        models,
        vec![Some("sonar-reasoning".to_string()), Some("sonar".to_string())]
    );
}

#[tokio::test]
async fn overseas_analysis_skips_acquisition() {
    let harness = harness(
        Err(AcquisitionFailure::Structure {
            detail: "unreachable".to_string(),
        }),
        Ok(generated_report()),
    );

    let response = harness
        .service
        .analyze(analysis_request(Some("해외")), None)
        .await
        .expect("overseas analysis succeeds");

    assert!(harness.acquirer.calls().is_empty());
    assert!(harness.requester.requests()[0].records.is_empty());
    assert_eq!(response.financial_table, "| 지표 |\n| :--- |\n");
    assert_eq!(harness.store.reports()[0].market, "NASDAQ");
}

#[tokio::test]
async fn analyze_stores_domestic_report() {
    let harness = default_harness();
    harness
        .service
        .analyze(analysis_request(Some("국내")), None)
        .await
        .expect("analysis succeeds");

    let reports = harness.store.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].market, "KOSPI");
    assert_eq!(reports[0].symbol, "005930");
    assert_eq!(reports[0].name, "삼성전자");
    assert_eq!(reports[0].report.citations, vec!["https://dart.fss.or.kr"]);
    assert!(reports[0].sector.is_none());
}

#[tokio::test]
async fn store_failure_does_not_fail_analysis() {
    let service = InvestmentAnalysisService::new(
        Arc::new(StubAcquirer::new(Ok(quarterly_grid()))),
        Arc::new(StubRequester::new(Ok(generated_report()))),
        Arc::new(OfflineStore),
        MarkdownArchive::disabled(),
    );

    let response = service
        .analyze(analysis_request(None), None)
        .await
        .expect("analysis succeeds despite store failure");
    assert_eq!(response.created, 1_760_000_000);
}

#[tokio::test]
async fn blank_api_key_is_rejected_before_any_call() {
    let harness = default_harness();
    let mut request = analysis_request(None);
    request.api_key = "   ".to_string();

    let error = harness
        .service
        .analyze(request, None)
        .await
        .expect_err("missing key");

    assert!(matches!(error, AnalysisServiceError::MissingApiKey));
    assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    assert!(harness.acquirer.calls().is_empty());
    assert!(harness.requester.requests().is_empty());
}

#[tokio::test]
async fn unmatched_periods_on_narrow_table_report_no_data() {
    let narrow = crate::workflows::financials::Grid::from_text_rows(vec![
        vec!["항목", "2024.06", "2025.06"],
        vec!["", "IFRS연결", "IFRS연결"],
        vec!["매출액", "1000000", "1100000"],
    ]);
    let harness = harness(Ok(narrow), Ok(generated_report()));
    let mut request = analysis_request(None);
    request.compare_periods = vec!["1999.12".to_string()];

    let error = harness
        .service
        .analyze(request, None)
        .await
        .expect_err("no data");

    assert!(matches!(error, AnalysisServiceError::NoFinancialData { .. }));
    assert!(harness.requester.requests().is_empty());
}

#[tokio::test]
async fn generation_failures_map_to_statuses() {
    let cases = [
        (
            GenerationFailure::InvalidRequest("bad model".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            GenerationFailure::AuthFailure("bad key".to_string()),
            StatusCode::UNAUTHORIZED,
        ),
        (
            GenerationFailure::RateLimitOrServerError("429".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            GenerationFailure::NetworkFailure("reset".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            GenerationFailure::UnknownFailure("?".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (failure, status) in cases {
        let harness = harness(Ok(quarterly_grid()), Err(failure));
        let error = harness
            .service
            .analyze(analysis_request(None), None)
            .await
            .expect_err("generation fails");
        assert_eq!(error.status_code(), status);
        assert!(harness.store.reports().is_empty());
    }
}

#[test]
fn acquisition_failures_map_to_statuses() {
    let structure = AnalysisServiceError::from(AcquisitionFailure::Structure {
        detail: "financial region not found".to_string(),
    });
    assert_eq!(structure.status_code(), StatusCode::NOT_FOUND);
    assert!(structure.detail().contains("financial region not found"));

    let parser = AnalysisServiceError::from(AcquisitionFailure::Parser {
        detail: "invalid selector".to_string(),
    });
    assert_eq!(parser.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn save_markdown_honours_disabled_archive() {
    let harness = default_harness();
    let response = harness
        .service
        .save_markdown(SaveMarkdownRequest {
            content: "# report".to_string(),
            filename: None,
        })
        .await
        .expect("save answers");

    assert!(!response.saved);
    assert!(response.disabled);
}
