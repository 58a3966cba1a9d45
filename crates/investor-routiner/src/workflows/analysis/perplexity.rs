use super::prompt::{PromptTemplate, SYSTEM_PROMPT};
use super::requester::{GeneratedReport, GenerationFailure, GenerationRequest, ReportRequester};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const COMPLETIONS_PATH: &str = "/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.2;
const TOP_P: f32 = 0.9;

/// Perplexity chat-completions client.
pub struct PerplexityRequester {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
    template: PromptTemplate,
}

impl PerplexityRequester {
    pub fn new(
        base_url: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: default_model.into(),
            template: PromptTemplate::standard(),
        })
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    fn model_for(&self, request: &GenerationRequest) -> String {
        request
            .context
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(&self.default_model)
            .to_string()
    }
}

#[async_trait]
impl ReportRequester for PerplexityRequester {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedReport, GenerationFailure> {
        let prompt = self.template.render(&request);
        debug!(length = prompt.len(), %prompt, "composed report prompt");

        let model = self.model_for(&request);
        let payload = CompletionRequest {
            model: &model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            return_citations: true,
        };

        info!(
            %model,
            stock_code = %request.context.stock_code,
            "sending report generation request"
        );
        let response = self
            .client
            .post(format!("{}{}", self.base_url, COMPLETIONS_PATH))
            .bearer_auth(&request.context.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| GenerationFailure::NetworkFailure(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GenerationFailure::NetworkFailure(err.to_string()))?;
        info!(status = status.as_u16(), bytes = body.len(), "report generation response received");

        let data: Value = serde_json::from_str(&body).unwrap_or_else(|_| json!({ "raw": body }));
        check_status(status, &data)?;
        parse_completion(data)
    }
}

/// Maps non-success statuses onto failure kinds.
fn check_status(status: StatusCode, data: &Value) -> Result<(), GenerationFailure> {
    if status.is_success() {
        return Ok(());
    }

    let failure = match status {
        StatusCode::BAD_REQUEST => GenerationFailure::InvalidRequest(
            error_message(data).unwrap_or_else(|| "bad request (400)".to_string()),
        ),
        StatusCode::UNAUTHORIZED => GenerationFailure::AuthFailure(
            "authentication failed (401); check the API key".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => GenerationFailure::RateLimitOrServerError(
            "rate limit exceeded (429); retry later".to_string(),
        ),
        status if status.is_server_error() => GenerationFailure::RateLimitOrServerError(format!(
            "server error ({})",
            status.as_u16()
        )),
        status => GenerationFailure::UnknownFailure(format!(
            "unexpected status {}: {}",
            status.as_u16(),
            error_message(data).unwrap_or_default()
        )),
    };
    warn!(status = status.as_u16(), error = %failure, "report generation rejected");
    Err(failure)
}

fn error_message(data: &Value) -> Option<String> {
    match data.get("error")? {
        Value::String(message) => Some(message.clone()),
        error => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(error.to_string())),
    }
}

fn parse_completion(data: Value) -> Result<GeneratedReport, GenerationFailure> {
    if data.get("choices").is_none() {
        let detail = match error_message(&data) {
            Some(message) => format!("provider error: {message}"),
            None => format!("response is missing 'choices': {data}"),
        };
        warn!(%detail, "malformed report generation response");
        return Err(GenerationFailure::InvalidRequest(detail));
    }

    let completion: CompletionResponse = serde_json::from_value(data)
        .map_err(|err| GenerationFailure::InvalidRequest(format!("unreadable response: {err}")))?;
    let text = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| GenerationFailure::UnknownFailure("response has no choices".to_string()))?;

    Ok(GeneratedReport {
        text,
        citations: completion.citations,
        model: completion.model,
        usage: completion.usage.unwrap_or_else(|| json!({})),
        created: completion.created,
    })
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_citations: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<Value>,
    #[serde(default)]
    created: i64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
