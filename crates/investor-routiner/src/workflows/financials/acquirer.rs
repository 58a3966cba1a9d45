use super::extract::extract_grid;
use super::grid::Grid;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::{info, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source of financial statement tables keyed by stock code.
#[async_trait]
pub trait TableAcquirer: Send + Sync {
    async fn fetch(&self, stock_code: &str) -> Result<Grid, AcquisitionFailure>;
}

/// Reason a financial table could not be acquired. Every variant carries a
/// human-readable detail for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionFailure {
    #[error("request failed: {detail}")]
    Transport { detail: String },
    #[error("upstream answered with status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected page structure: {detail}")]
    Structure { detail: String },
    #[error("table parser unavailable: {detail}")]
    Parser { detail: String },
}

impl AcquisitionFailure {
    pub fn detail(&self) -> &str {
        match self {
            AcquisitionFailure::Transport { detail }
            | AcquisitionFailure::Status { detail, .. }
            | AcquisitionFailure::Structure { detail }
            | AcquisitionFailure::Parser { detail } => detail,
        }
    }
}

impl From<reqwest::Error> for AcquisitionFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            detail: err.to_string(),
        }
    }
}

/// Scrapes the item page of Naver Finance.
pub struct NaverTableAcquirer {
    client: reqwest::Client,
    base_url: String,
}

impl NaverTableAcquirer {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn item_url(&self) -> String {
        format!("{}/item/main.nhn", self.base_url)
    }

    async fn fetch_grid(&self, url: &str, stock_code: &str) -> Result<Grid, AcquisitionFailure> {
        let response = self
            .client
            .get(url)
            .query(&[("code", stock_code)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionFailure::Status {
                status: status.as_u16(),
                detail: format!("GET {url} for {stock_code}"),
            });
        }

        let body = response.text().await?;
        extract_grid(&body)
    }
}

#[async_trait]
impl TableAcquirer for NaverTableAcquirer {
    async fn fetch(&self, stock_code: &str) -> Result<Grid, AcquisitionFailure> {
        let url = self.item_url();
        let result = self.fetch_grid(&url, stock_code).await;

        match &result {
            Ok(grid) => info!(
                stock_code,
                rows = grid.row_count(),
                columns = grid.column_count(),
                "financial table extracted"
            ),
            Err(err) => warn!(stock_code, error = %err, "financial table extraction failed"),
        }

        result
    }
}
