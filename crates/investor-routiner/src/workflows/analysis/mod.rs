//! Investment report generation on top of scraped financial tables.
//!
//! The service fetches a company's financial table (domestic listings only),
//! asks a text-generation provider for a report, renders the records as a
//! markdown table and stores the result without letting storage failures
//! reach the caller.

pub mod domain;
pub(crate) mod outputs;
pub mod perplexity;
pub(crate) mod prompt;
pub mod requester;
pub mod router;
pub mod service;
pub mod store;
pub mod supabase;

#[cfg(test)]
mod tests;

pub use domain::{
    AnalysisRequest, AnalysisResponse, FinancialRequest, FinancialResponse, Market,
    SaveMarkdownRequest, SaveMarkdownResponse,
};
pub use outputs::{sanitize_filename, MarkdownArchive};
pub use perplexity::PerplexityRequester;
pub use prompt::{PromptTemplate, SYSTEM_PROMPT};
pub use requester::{
    GeneratedReport, GenerationContext, GenerationFailure, GenerationRequest, ReportRequester,
};
pub use router::analysis_router;
pub use service::{AnalysisServiceError, InvestmentAnalysisService};
pub use store::{ReportFields, ReportStore, StoreFailure, StoredReport};
pub use supabase::SupabaseReportStore;
