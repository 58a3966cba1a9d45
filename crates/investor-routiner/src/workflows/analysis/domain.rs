use crate::workflows::financials::PeriodRecord;
use serde::{Deserialize, Serialize};

/// Which exchange family a requested company belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    /// KOSPI / KOSDAQ; financial tables are scraped before generation.
    Domestic,
    /// Overseas listings; generation runs without a financial table.
    Overseas,
}

impl Market {
    pub const DOMESTIC_LABEL: &'static str = "국내";
    pub const OVERSEAS_LABEL: &'static str = "해외";

    /// Absent or blank labels default to the domestic market; any label other
    /// than `국내` is treated as overseas.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            None | Some("") => Self::Domestic,
            Some(Self::DOMESTIC_LABEL) => Self::Domestic,
            Some(_) => Self::Overseas,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Domestic => Self::DOMESTIC_LABEL,
            Self::Overseas => Self::OVERSEAS_LABEL,
        }
    }

    /// Market name recorded alongside persisted reports.
    pub fn storage_label(&self) -> &'static str {
        match self {
            Self::Domestic => "KOSPI",
            Self::Overseas => "NASDAQ",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinancialRequest {
    pub stock_code: String,
    pub compare_periods: Vec<String>,
    #[serde(default)]
    pub stock_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialResponse {
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub compare_periods: Vec<String>,
    pub financial_data: Vec<PeriodRecord>,
    pub csv_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub stock_code: String,
    pub stock_name: String,
    pub compare_periods: Vec<String>,
    pub api_key: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub stock_code: String,
    pub stock_name: String,
    pub compare_periods: Vec<String>,
    pub analysis: String,
    pub financial_table: String,
    pub citations: Vec<String>,
    pub model: String,
    pub usage: serde_json::Value,
    pub created: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveMarkdownRequest {
    pub content: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveMarkdownResponse {
    pub saved: bool,
    pub path: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    pub message: String,
}
