//! Alternate-path adapter: OpenAI Responses API with an MCP tool proxy
//!
//! Cross-transport validation: instead of posting JSON-RPC directly, each
//! natural-language prompt is sent to the Responses API configured with an
//! `mcp` tool pointing at the server under test, and the structured output
//! stream is inspected for the tool calls the model made.
//!
//! Two failure modes are kept apart: the API call itself failing
//! ([`OrchestratorError::ApiFailure`]) and the orchestration layer being
//! unable to route to the MCP tool proxy
//! ([`OrchestratorError::FeatureUnavailable`]). The latter tells the driver
//! to fall back to the direct protocol suite so the server still gets
//! verified. Missing credentials skip this stage entirely and are never a
//! test failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default model for the Responses API.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default Responses API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/responses";

/// Timeout for orchestrator calls; the model may make several tool hops.
const API_TIMEOUT: Duration = Duration::from_secs(120);

/// Built-in prompts expected to trigger MCP tool calls on the server under
/// test.
pub fn builtin_prompts() -> Vec<String> {
    [
        "What is the monthly payment for a $300,000 mortgage at 6.5% for 30 years?",
        "Calculate the compound interest on $10,000 at 7% for 10 years with monthly compounding",
        "What are the current mortgage rates?",
        "Estimate federal taxes for someone earning $85,000 as single filer",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Failures of the orchestrator path.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The API call itself failed (network, auth, quota, server error)
    #[error("orchestrator API call failed: {0}")]
    ApiFailure(String),

    /// The orchestration layer cannot route to the MCP tool proxy;
    /// the caller should fall back to direct endpoint testing
    #[error("orchestrator cannot route to the MCP tool proxy: {0}")]
    FeatureUnavailable(String),
}

/// Configuration for the Responses API client.
#[derive(Debug, Clone)]
pub struct ResponsesConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
}

impl ResponsesConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    tools: Vec<McpToolSpec<'a>>,
}

#[derive(Serialize)]
struct McpToolSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    server_label: &'a str,
    server_url: &'a str,
    require_approval: &'static str,
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

/// One entry in the Responses API output stream.
///
/// The stream is a fixed, finite set of tagged record shapes, so it is a
/// closed enum matched exhaustively; unknown tags land in `Other`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OutputItem {
    /// The model invoked an MCP tool through the proxy
    #[serde(rename = "mcp_call")]
    McpCall {
        name: String,
        #[serde(default)]
        arguments: Value,
    },

    /// Output returned from an MCP tool invocation
    #[serde(rename = "mcp_call_output")]
    McpCallOutput {
        #[serde(default)]
        output: String,
    },

    /// A plain assistant message
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },

    /// Any output type this harness does not inspect
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

/// What the harness observed while one prompt was being orchestrated.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    ToolCall { name: String, arguments: Value },
    ToolOutput(String),
    AssistantMessage(String),
}

/// Per-prompt outcome of the orchestrator path.
#[derive(Debug, Clone)]
pub struct PromptOutcome {
    pub prompt: String,
    pub status: Option<String>,
    pub events: Vec<ObservedEvent>,
}

/// Error object shape returned by the OpenAI API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    param: Option<String>,
}

/// Client for the Responses API.
pub struct ResponsesClient {
    client: reqwest::Client,
    config: ResponsesConfig,
}

impl ResponsesClient {
    pub fn new(config: ResponsesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Run one prompt through the orchestrator with the MCP proxy attached.
    pub async fn run_prompt(
        &self,
        prompt: &str,
        server_label: &str,
        server_url: &str,
    ) -> Result<PromptOutcome, OrchestratorError> {
        let body = ResponsesRequest {
            model: &self.config.model,
            input: prompt,
            tools: vec![McpToolSpec {
                kind: "mcp",
                server_label,
                server_url,
                require_approval: "never",
            }],
        };

        tracing::debug!(model = %self.config.model, %server_url, "sending Responses API request");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestratorError::ApiFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), &error_text));
        }

        let parsed: ResponsesBody = response
            .json()
            .await
            .map_err(|e| OrchestratorError::ApiFailure(format!("invalid response body: {}", e)))?;

        Ok(PromptOutcome {
            prompt: prompt.to_string(),
            status: parsed.status,
            events: extract_events(&parsed.output),
        })
    }

    /// Run every prompt in order. Individual API failures are recorded per
    /// prompt; `FeatureUnavailable` aborts the stage so the caller can fall
    /// back to direct testing.
    pub async fn run_prompts(
        &self,
        prompts: &[String],
        server_label: &str,
        server_url: &str,
    ) -> Result<Vec<Result<PromptOutcome, String>>, OrchestratorError> {
        let mut outcomes = Vec::with_capacity(prompts.len());

        for prompt in prompts {
            match self.run_prompt(prompt, server_label, server_url).await {
                Ok(outcome) => outcomes.push(Ok(outcome)),
                Err(OrchestratorError::FeatureUnavailable(reason)) => {
                    return Err(OrchestratorError::FeatureUnavailable(reason));
                }
                Err(OrchestratorError::ApiFailure(reason)) => {
                    tracing::warn!(%prompt, %reason, "orchestrator prompt failed");
                    outcomes.push(Err(reason));
                }
            }
        }

        Ok(outcomes)
    }
}

/// Fold the raw output stream into the events the harness cares about.
fn extract_events(output: &[OutputItem]) -> Vec<ObservedEvent> {
    let mut events = Vec::new();

    for item in output {
        match item {
            OutputItem::McpCall { name, arguments } => events.push(ObservedEvent::ToolCall {
                name: name.clone(),
                arguments: arguments.clone(),
            }),
            OutputItem::McpCallOutput { output } => {
                events.push(ObservedEvent::ToolOutput(output.clone()));
            }
            OutputItem::Message { content } => {
                for part in content {
                    if let Some(text) = &part.text {
                        events.push(ObservedEvent::AssistantMessage(text.clone()));
                    }
                }
            }
            OutputItem::Other => {}
        }
    }

    events
}

/// Classify a non-2xx API reply.
///
/// The distinction is structural, not a substring scan of the message: an
/// invalid-request error whose `param` is rooted at `tools`, or whose `code`
/// names an unknown/unsupported tool type, means the orchestration layer
/// cannot route to the MCP proxy. Everything else (auth, quota, 5xx) is a
/// plain API failure.
fn classify_api_error(status: u16, body: &str) -> OrchestratorError {
    let detail = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => {
            return OrchestratorError::ApiFailure(format!("HTTP {}: {}", status, body));
        }
    };

    let invalid_request = detail.kind.as_deref() == Some("invalid_request_error");
    let param_is_tools = detail
        .param
        .as_deref()
        .is_some_and(|p| p == "tools" || p.starts_with("tools["));
    let code_is_tool_support = detail
        .code
        .as_deref()
        .is_some_and(|c| c == "unsupported_tool");

    if invalid_request && (param_is_tools || code_is_tool_support) {
        OrchestratorError::FeatureUnavailable(detail.message)
    } else {
        OrchestratorError::ApiFailure(format!("HTTP {}: {}", status, detail.message))
    }
}
