use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use super::store::{ReportStore, StoredReport, StoreFailure};
use crate::config::StoreConfig;

const REPORTS_PATH: &str = "/rest/v1/reports";
const INSERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Inserts reports into the Supabase `reports` table over PostgREST.
pub struct SupabaseReportStore {
    client: reqwest::Client,
    target: Option<StoreTarget>,
}

struct StoreTarget {
    endpoint: String,
    service_role_key: String,
}

impl SupabaseReportStore {
    /// Without credentials every insert reports [`StoreFailure::NotConfigured`].
    pub fn new(config: Option<&StoreConfig>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(INSERT_TIMEOUT)
            .build()?;

        let target = config.map(|config| StoreTarget {
            endpoint: format!("{}{}", config.url.trim_end_matches('/'), REPORTS_PATH),
            service_role_key: config.service_role_key.clone(),
        });

        Ok(Self { client, target })
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }
}

impl StoreTarget {
    fn headers(&self) -> Result<HeaderMap, StoreFailure> {
        let invalid = |_| StoreFailure::Transport("service role key is not a valid header".into());
        let key = HeaderValue::from_str(&self.service_role_key).map_err(invalid)?;
        let bearer =
            HeaderValue::from_str(&format!("Bearer {}", self.service_role_key)).map_err(invalid)?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("prefer", HeaderValue::from_static("return=minimal"));
        Ok(headers)
    }
}

#[async_trait]
impl ReportStore for SupabaseReportStore {
    async fn store(&self, report: StoredReport) -> Result<(), StoreFailure> {
        let target = self.target.as_ref().ok_or(StoreFailure::NotConfigured)?;

        let response = self
            .client
            .post(&target.endpoint)
            .headers(target.headers()?)
            .json(&report)
            .send()
            .await
            .map_err(|err| StoreFailure::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %detail, "report insert rejected");
            return Err(StoreFailure::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        debug!(symbol = %report.symbol, market = report.market, "report stored");
        Ok(())
    }
}
