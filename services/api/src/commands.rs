use crate::infra::build_service;
use clap::Args;
use investor_routiner::config::AppConfig;
use investor_routiner::error::AppError;
use investor_routiner::workflows::analysis::{AnalysisRequest, FinancialRequest, Market};
use investor_routiner::workflows::financials::FinancialTable;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CrawlArgs {
    /// Six-digit stock code, e.g. 005930
    #[arg(long)]
    pub(crate) code: String,
    /// Reporting period to extract (repeatable), e.g. 2024.12
    #[arg(long = "period", required = true)]
    pub(crate) periods: Vec<String>,
    /// Directory for the CSV copy of the scraped table (overrides CRAWL_EXPORT_DIR)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Stock code or ticker
    #[arg(long)]
    pub(crate) code: String,
    /// Company name used in the report
    #[arg(long)]
    pub(crate) name: String,
    /// Reporting period to compare (repeatable)
    #[arg(long = "period")]
    pub(crate) periods: Vec<String>,
    /// Report generation API key
    #[arg(long, env = "PERPLEXITY_API_KEY", hide_env_values = true)]
    pub(crate) api_key: String,
    /// Model overriding the configured default
    #[arg(long)]
    pub(crate) model: Option<String>,
    /// Market label: 국내 (default) or 해외
    #[arg(long, default_value = Market::DOMESTIC_LABEL)]
    pub(crate) market: String,
}

pub(crate) async fn run_crawl(args: CrawlArgs) -> Result<(), AppError> {
    let CrawlArgs {
        code,
        periods,
        csv,
    } = args;

    let mut config = AppConfig::load()?;
    if csv.is_some() {
        config.sources.export_dir = csv;
    }
    let service = build_service(&config)?;

    let response = service
        .crawl(FinancialRequest {
            stock_code: code,
            compare_periods: periods,
            stock_name: None,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&response.financial_data)?);
    println!();
    print!(
        "{}",
        FinancialTable::from_records(&response.financial_data).to_markdown()
    );
    if let Some(path) = &response.csv_path {
        println!("\nCSV saved to {path}");
    }

    Ok(())
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        code,
        name,
        periods,
        api_key,
        model,
        market,
    } = args;

    let config = AppConfig::load()?;
    let service = build_service(&config)?;

    let response = service
        .analyze(
            AnalysisRequest {
                stock_code: code,
                stock_name: name,
                compare_periods: periods,
                api_key,
                model,
                market: Some(market),
            },
            None,
        )
        .await?;

    println!("{}", response.analysis);
    println!("\n## Financial data\n");
    print!("{}", response.financial_table);
    if !response.citations.is_empty() {
        println!("\n## Sources\n");
        for (index, citation) in response.citations.iter().enumerate() {
            println!("{}. {citation}", index + 1);
        }
    }
    println!("\nModel: {}", response.model);

    Ok(())
}
