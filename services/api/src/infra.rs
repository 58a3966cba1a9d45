use investor_routiner::config::AppConfig;
use investor_routiner::error::AppError;
use investor_routiner::workflows::analysis::{
    InvestmentAnalysisService, MarkdownArchive, PerplexityRequester, SupabaseReportStore,
};
use investor_routiner::workflows::financials::NaverTableAcquirer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveAnalysisService =
    InvestmentAnalysisService<NaverTableAcquirer, PerplexityRequester, SupabaseReportStore>;

/// Wires the production collaborators from configuration.
pub(crate) fn build_service(config: &AppConfig) -> Result<LiveAnalysisService, AppError> {
    let acquirer = Arc::new(NaverTableAcquirer::new(
        config.sources.naver_base_url.clone(),
    )?);
    let requester = Arc::new(PerplexityRequester::new(
        config.generation.base_url.clone(),
        config.generation.default_model.clone(),
    )?);

    let store = SupabaseReportStore::new(config.store.as_ref())?;
    if store.is_configured() {
        info!("report persistence enabled");
    } else {
        warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY missing; reports will not be stored");
    }

    let archive = MarkdownArchive::new(
        config.outputs.dir.clone(),
        config.outputs.server_save_enabled,
    );

    Ok(
        InvestmentAnalysisService::new(acquirer, requester, Arc::new(store), archive)
            .with_export_dir(config.sources.export_dir.clone()),
    )
}
