use super::domain::Market;
use crate::workflows::financials::PeriodRecord;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Outbound text-generation client producing investment reports.
#[async_trait]
pub trait ReportRequester: Send + Sync {
    async fn generate(&self, request: GenerationRequest)
        -> Result<GeneratedReport, GenerationFailure>;
}

/// Everything a requester needs to write a report for one company.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub subject_name: String,
    pub records: Vec<PeriodRecord>,
    pub requested_periods: Vec<String>,
    pub context: GenerationContext,
}

#[derive(Clone)]
pub struct GenerationContext {
    pub stock_code: String,
    pub market: Market,
    pub api_key: String,
    /// Overrides the requester's default model when set.
    pub model: Option<String>,
    pub today: NaiveDate,
}

impl std::fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationContext")
            .field("stock_code", &self.stock_code)
            .field("market", &self.market)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("today", &self.today)
            .finish()
    }
}

/// Unstructured report text plus provider metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub text: String,
    pub citations: Vec<String>,
    pub model: String,
    pub usage: serde_json::Value,
    /// Provider creation time, seconds since the Unix epoch.
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationFailure {
    #[error("generation request rejected: {0}")]
    InvalidRequest(String),
    #[error("generation API authentication failed: {0}")]
    AuthFailure(String),
    #[error("generation API unavailable: {0}")]
    RateLimitOrServerError(String),
    #[error("generation API network error: {0}")]
    NetworkFailure(String),
    #[error("unexpected generation failure: {0}")]
    UnknownFailure(String),
}
