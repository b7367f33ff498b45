//! Harness configuration
//!
//! Read-only inputs from the environment, overridable from the CLI. A missing
//! API key is not an error: it degrades the run by skipping the orchestrator
//! stage.

use crate::responses::DEFAULT_MODEL;

/// Default endpoint under test when `MCP_SERVER_URL` is not set.
pub const DEFAULT_SERVER_URL: &str = "https://numerai-finance-production.up.railway.app/mcp";

/// Label the orchestrator uses for the MCP tool proxy.
pub const SERVER_LABEL: &str = "numerai_finance";

/// Resolved harness configuration for one run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// JSON-RPC endpoint under test
    pub server_url: String,

    /// OpenAI API key; `None` skips the orchestrator stage
    pub api_key: Option<String>,

    /// Model for the Responses API
    pub model: String,
}

impl HarnessConfig {
    /// Build configuration from the environment, with an optional server URL
    /// override (from the CLI) taking precedence over `MCP_SERVER_URL`.
    pub fn from_env(server_url_override: Option<String>) -> Self {
        let server_url = server_url_override
            .or_else(|| non_empty_env("MCP_SERVER_URL"))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Self {
            server_url,
            api_key: non_empty_env("OPENAI_API_KEY"),
            model: non_empty_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
