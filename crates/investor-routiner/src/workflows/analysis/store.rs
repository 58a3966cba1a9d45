use async_trait::async_trait;
use serde::Serialize;

use super::domain::Market;

/// Row persisted for every generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    pub market: &'static str,
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub report: ReportFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl StoredReport {
    pub fn new(
        market: Market,
        symbol: impl Into<String>,
        name: impl Into<String>,
        report: ReportFields,
    ) -> Self {
        Self {
            market: market.storage_label(),
            symbol: symbol.into(),
            name: name.into(),
            sector: None,
            report,
            user_id: None,
        }
    }
}

/// JSON document stored in the `report` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFields {
    pub analysis: String,
    pub financial_table: String,
    pub citations: Vec<String>,
    pub model: String,
    pub usage: serde_json::Value,
    pub created: i64,
}

/// Persistence seam for generated reports. Failures never fail an analysis.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn store(&self, report: StoredReport) -> Result<(), StoreFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreFailure {
    #[error("report store is not configured")]
    NotConfigured,
    #[error("report store unreachable: {0}")]
    Transport(String),
    #[error("report store rejected insert ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}
