use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Local;
use tracing::{info, warn};

use super::domain::{
    AnalysisRequest, AnalysisResponse, FinancialRequest, FinancialResponse, Market,
    SaveMarkdownRequest, SaveMarkdownResponse,
};
use super::outputs::MarkdownArchive;
use super::requester::{GenerationContext, GenerationFailure, GenerationRequest, ReportRequester};
use super::store::{ReportFields, ReportStore, StoredReport};
use crate::workflows::financials::{
    export_grid_csv, period_records, AcquisitionFailure, ExportError, FinancialTable,
    PeriodRecord, TableAcquirer,
};

/// Service composing table acquisition, report generation and persistence.
pub struct InvestmentAnalysisService<Q, R, S> {
    acquirer: Arc<Q>,
    requester: Arc<R>,
    store: Arc<S>,
    archive: MarkdownArchive,
    export_dir: Option<PathBuf>,
}

/// Records for one company plus the CSV copy, when one was written.
struct Acquired {
    records: Vec<PeriodRecord>,
    csv_path: Option<PathBuf>,
}

impl<Q, R, S> InvestmentAnalysisService<Q, R, S>
where
    Q: TableAcquirer + 'static,
    R: ReportRequester + 'static,
    S: ReportStore + 'static,
{
    pub fn new(
        acquirer: Arc<Q>,
        requester: Arc<R>,
        store: Arc<S>,
        archive: MarkdownArchive,
    ) -> Self {
        Self {
            acquirer,
            requester,
            store,
            archive,
            export_dir: None,
        }
    }

    /// Writes a CSV copy of every acquired grid into `dir`.
    pub fn with_export_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.export_dir = dir;
        self
    }

    /// Scrape the financial table and reduce it to the requested periods.
    pub async fn crawl(
        &self,
        request: FinancialRequest,
    ) -> Result<FinancialResponse, AnalysisServiceError> {
        let acquired = self
            .acquire(&request.stock_code, &request.compare_periods)
            .await?;

        Ok(FinancialResponse {
            stock_code: request.stock_code,
            stock_name: request.stock_name,
            compare_periods: request.compare_periods,
            financial_data: acquired.records,
            csv_path: acquired.csv_path.map(|path| path.display().to_string()),
        })
    }

    /// Generate an investment report. `model_override` wins over the model in
    /// the request body, which wins over the requester's default.
    pub async fn analyze(
        &self,
        request: AnalysisRequest,
        model_override: Option<String>,
    ) -> Result<AnalysisResponse, AnalysisServiceError> {
        if request.api_key.trim().is_empty() {
            return Err(AnalysisServiceError::MissingApiKey);
        }

        let market = Market::from_label(request.market.as_deref());
        let records = match market {
            Market::Domestic => {
                self.acquire(&request.stock_code, &request.compare_periods)
                    .await?
                    .records
            }
            Market::Overseas => {
                info!(
                    stock_code = %request.stock_code,
                    "overseas market, skipping table acquisition"
                );
                Vec::new()
            }
        };

        let model = non_blank(model_override).or_else(|| non_blank(request.model.clone()));
        let report = self
            .requester
            .generate(GenerationRequest {
                subject_name: request.stock_name.clone(),
                records: records.clone(),
                requested_periods: request.compare_periods.clone(),
                context: GenerationContext {
                    stock_code: request.stock_code.clone(),
                    market,
                    api_key: request.api_key.clone(),
                    model,
                    today: Local::now().date_naive(),
                },
            })
            .await?;

        let financial_table = FinancialTable::from_records(&records).to_markdown();
        let response = AnalysisResponse {
            stock_code: request.stock_code,
            stock_name: request.stock_name,
            compare_periods: request.compare_periods,
            analysis: report.text,
            financial_table,
            citations: report.citations,
            model: report.model,
            usage: report.usage,
            created: report.created,
        };

        self.persist(market, &response).await;
        Ok(response)
    }

    pub async fn save_markdown(
        &self,
        request: SaveMarkdownRequest,
    ) -> Result<SaveMarkdownResponse, AnalysisServiceError> {
        let saved = self
            .archive
            .save(&request.content, request.filename.as_deref())
            .await?;
        Ok(saved)
    }

    async fn acquire(
        &self,
        stock_code: &str,
        periods: &[String],
    ) -> Result<Acquired, AnalysisServiceError> {
        let grid = self.acquirer.fetch(stock_code).await?;

        let csv_path = match &self.export_dir {
            Some(dir) => Some(export_grid_csv(&grid, dir, stock_code)?),
            None => None,
        };

        let records = if periods.is_empty() {
            Vec::new()
        } else {
            period_records(&grid, periods)
        };

        if records.is_empty() {
            warn!(%stock_code, ?periods, "no financial records for requested periods");
            return Err(AnalysisServiceError::NoFinancialData {
                stock_code: stock_code.to_string(),
            });
        }

        info!(%stock_code, records = records.len(), "financial records built");
        Ok(Acquired { records, csv_path })
    }

    async fn persist(&self, market: Market, response: &AnalysisResponse) {
        let stored = StoredReport::new(
            market,
            response.stock_code.clone(),
            response.stock_name.clone(),
            ReportFields {
                analysis: response.analysis.clone(),
                financial_table: response.financial_table.clone(),
                citations: response.citations.clone(),
                model: response.model.clone(),
                usage: response.usage.clone(),
                created: response.created,
            },
        );

        if let Err(err) = self.store.store(stored).await {
            warn!(error = %err, stock_code = %response.stock_code, "failed to store report");
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Error raised by the analysis service.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisServiceError {
    #[error("api_key is required")]
    MissingApiKey,
    #[error(transparent)]
    Acquisition(#[from] AcquisitionFailure),
    #[error("financial data not found for {stock_code}")]
    NoFinancialData { stock_code: String },
    #[error(transparent)]
    Generation(#[from] GenerationFailure),
    #[error("failed to export financial table: {0}")]
    Export(#[from] ExportError),
    #[error("failed to save markdown: {0}")]
    Archive(#[from] std::io::Error),
}

impl AnalysisServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingApiKey => StatusCode::BAD_REQUEST,
            Self::Acquisition(AcquisitionFailure::Parser { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Acquisition(_) | Self::NoFinancialData { .. } => StatusCode::NOT_FOUND,
            Self::Generation(GenerationFailure::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            Self::Generation(GenerationFailure::AuthFailure(_)) => StatusCode::UNAUTHORIZED,
            Self::Generation(
                GenerationFailure::RateLimitOrServerError(_) | GenerationFailure::NetworkFailure(_),
            ) => StatusCode::BAD_GATEWAY,
            Self::Generation(GenerationFailure::UnknownFailure(_))
            | Self::Export(_)
            | Self::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; acquisition failures keep their diagnostic.
    pub fn detail(&self) -> String {
        match self {
            Self::Acquisition(AcquisitionFailure::Parser { detail }) => format!(
                "financial table parser is unavailable ({detail}); check the service build"
            ),
            Self::Acquisition(failure) => {
                format!("financial data not found: {}", failure.detail())
            }
            other => other.to_string(),
        }
    }
}
