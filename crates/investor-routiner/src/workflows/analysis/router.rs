use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AnalysisRequest, FinancialRequest, SaveMarkdownRequest};
use super::requester::ReportRequester;
use super::service::{AnalysisServiceError, InvestmentAnalysisService};
use super::store::ReportStore;
use crate::workflows::financials::TableAcquirer;

/// Router exposing financial crawling, report generation and markdown saving.
pub fn analysis_router<Q, R, S>(service: Arc<InvestmentAnalysisService<Q, R, S>>) -> Router
where
    Q: TableAcquirer + 'static,
    R: ReportRequester + 'static,
    S: ReportStore + 'static,
{
    Router::new()
        .route("/api/financial/crawl", post(crawl_handler::<Q, R, S>))
        .route("/api/analysis/analyze", post(analyze_handler::<Q, R, S>))
        .route(
            "/api/analysis/save_markdown",
            post(save_markdown_handler::<Q, R, S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ModelQuery {
    model: Option<String>,
}

pub(crate) async fn crawl_handler<Q, R, S>(
    State(service): State<Arc<InvestmentAnalysisService<Q, R, S>>>,
    axum::Json(request): axum::Json<FinancialRequest>,
) -> Response
where
    Q: TableAcquirer + 'static,
    R: ReportRequester + 'static,
    S: ReportStore + 'static,
{
    match service.crawl(request).await {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analyze_handler<Q, R, S>(
    State(service): State<Arc<InvestmentAnalysisService<Q, R, S>>>,
    Query(query): Query<ModelQuery>,
    axum::Json(request): axum::Json<AnalysisRequest>,
) -> Response
where
    Q: TableAcquirer + 'static,
    R: ReportRequester + 'static,
    S: ReportStore + 'static,
{
    match service.analyze(request, query.model).await {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_markdown_handler<Q, R, S>(
    State(service): State<Arc<InvestmentAnalysisService<Q, R, S>>>,
    axum::Json(request): axum::Json<SaveMarkdownRequest>,
) -> Response
where
    Q: TableAcquirer + 'static,
    R: ReportRequester + 'static,
    S: ReportStore + 'static,
{
    match service.save_markdown(request).await {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AnalysisServiceError) -> Response {
    let payload = json!({
        "error": error.detail(),
    });
    (error.status_code(), axum::Json(payload)).into_response()
}
