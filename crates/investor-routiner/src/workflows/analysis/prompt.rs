use super::domain::Market;
use super::requester::GenerationRequest;
use std::fmt::Write;

const STANDARD_TEMPLATE: &str = include_str!("../../../templates/investment_report.md");

const COMPANY_PLACEHOLDER: &str = "[company name]";
const DATA_PLACEHOLDER: &str = "{financial-json}";
const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

pub const SYSTEM_PROMPT: &str = "You are an expert investment analyst. Provide comprehensive, data-driven analysis with clear recommendations.";

/// Report prompt with `[company name]`, `{financial-json}` and `YYYY-MM-DD`
/// placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    body: String,
}

impl PromptTemplate {
    pub fn standard() -> Self {
        Self::new(STANDARD_TEMPLATE)
    }

    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Fills the placeholders and appends the disambiguation context block.
    pub fn render(&self, request: &GenerationRequest) -> String {
        let financial_json =
            serde_json::to_string_pretty(&request.records).unwrap_or_else(|_| "[]".to_string());
        let today = request.context.today.format("%Y-%m-%d").to_string();

        let mut prompt = self
            .body
            .replace(COMPANY_PLACEHOLDER, &request.subject_name)
            .replace(DATA_PLACEHOLDER, &financial_json)
            .replace(DATE_PLACEHOLDER, &today);

        let _ = write!(
            prompt,
            "\n\n[Analysis context]\nMarket: {}\nStock code: {}\n\
             If the company name is ambiguous, resolve it as follows:\n\
             - Market={}: prefer Korean companies listed on KOSPI/KOSDAQ.\n\
             - Market={}: analyse companies listed on overseas exchanges such as the US.\n\
             - When a stock code is given, it takes precedence in identifying the company.\n",
            request.context.market.label(),
            request.context.stock_code,
            Market::DOMESTIC_LABEL,
            Market::OVERSEAS_LABEL,
        );

        prompt
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::analysis::requester::GenerationContext;
    use crate::workflows::financials::MetricValue;
    use chrono::NaiveDate;

    fn request() -> GenerationRequest {
        GenerationRequest {
            subject_name: "삼성전자".to_string(),
            records: vec![vec![("2024.06 - 매출액", MetricValue::Integer(740_683))]
                .into_iter()
                .collect()],
            requested_periods: vec!["2024.06".to_string()],
            context: GenerationContext {
                stock_code: "005930".to_string(),
                market: Market::Domestic,
                api_key: "key".to_string(),
                model: None,
                today: NaiveDate::from_ymd_opt(2025, 8, 14).expect("valid date"),
            },
        }
    }

    #[test]
    fn render_replaces_every_placeholder() {
        let template = PromptTemplate::new("[company name] on YYYY-MM-DD\n{financial-json}");
        let prompt = template.render(&request());

        assert!(prompt.starts_with("삼성전자 on 2025-08-14\n[\n"));
        assert!(prompt.contains("\"2024.06 - 매출액\": 740683"));
        assert!(prompt.contains("Market: 국내"));
        assert!(prompt.contains("Stock code: 005930"));
    }

    #[test]
    fn standard_template_carries_all_placeholders() {
        let body = STANDARD_TEMPLATE;
        assert!(body.contains(COMPANY_PLACEHOLDER));
        assert!(body.contains(DATA_PLACEHOLDER));
        assert!(body.contains(DATE_PLACEHOLDER));

        let prompt = PromptTemplate::standard().render(&request());
        assert!(!prompt.contains(COMPANY_PLACEHOLDER));
        assert!(!prompt.contains(DATA_PLACEHOLDER));
    }
}
