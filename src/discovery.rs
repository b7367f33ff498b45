//! Discovery prober
//!
//! MCP servers may publish metadata under a handful of well-known paths
//! relative to their base URL. The prober issues a GET to each and reports
//! which returned well-formed JSON. Absence of a discovery endpoint is an
//! expected, valid outcome for many servers, so nothing here ever counts
//! against the run's overall success.

use serde_json::Value;
use std::time::Duration;

/// Timeout for discovery probes (shorter than protocol calls)
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Well-known discovery paths, probed in this order.
pub const WELL_KNOWN_PATHS: &[&str] = &[
    "/.well-known/oauth-protected-resource",
    "/.well-known/mcp-server",
    "/.well-known/mcp/tools",
    "/mcp/.well-known/oauth-protected-resource",
];

/// Outcome of probing a single discovery path.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// 2xx with a well-formed JSON body (stored in full; truncated only
    /// at display time)
    Found(Value),

    /// Non-2xx status; expected for servers without that endpoint
    NotFound(u16),

    /// Connection failure or a 2xx body that was not JSON
    Error(String),
}

/// One probed path and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub path: String,
    pub outcome: ProbeOutcome,
}

/// Discovery prober over a shared HTTP client.
pub struct DiscoveryProber {
    client: reqwest::Client,
}

impl DiscoveryProber {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Probe each path sequentially against the base URL.
    ///
    /// Probes are independent; sequential execution only keeps the output
    /// deterministic and readable.
    pub async fn probe(&self, base_url: &str, paths: &[&str]) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            let url = format!("{}{}", base_url, path);
            tracing::debug!(%url, "probing discovery endpoint");
            let outcome = self.probe_one(&url).await;
            results.push(ProbeResult {
                path: path.to_string(),
                outcome,
            });
        }

        results
    }

    async fn probe_one(&self, url: &str) -> ProbeOutcome {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return ProbeOutcome::Error(e.to_string()),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return ProbeOutcome::Error(e.to_string()),
        };

        classify_probe(status, &body)
    }
}

/// Derive the discovery base URL: the server URL with any trailing `/mcp`
/// suffix stripped.
pub fn discovery_base_url(server_url: &str) -> String {
    let trimmed = server_url.trim_end_matches('/');
    match trimmed.strip_suffix("/mcp") {
        Some(base) => base.to_string(),
        None => trimmed.to_string(),
    }
}

/// Classify a probe's HTTP status + body. Pure function for testability.
pub fn classify_probe(status: u16, body: &str) -> ProbeOutcome {
    if !(200..300).contains(&status) {
        return ProbeOutcome::NotFound(status);
    }

    match serde_json::from_str::<Value>(body) {
        Ok(json) => ProbeOutcome::Found(json),
        Err(e) => ProbeOutcome::Error(format!("body is not valid JSON: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_strips_mcp_suffix() {
        assert_eq!(
            discovery_base_url("https://example.com/mcp"),
            "https://example.com"
        );
        assert_eq!(
            discovery_base_url("https://example.com/mcp/"),
            "https://example.com"
        );
    }

    #[test]
    fn test_base_url_without_suffix_is_unchanged() {
        assert_eq!(
            discovery_base_url("https://example.com"),
            "https://example.com"
        );
        // Only a trailing path segment is stripped
        assert_eq!(
            discovery_base_url("https://mcp.example.com"),
            "https://mcp.example.com"
        );
    }

    #[test]
    fn test_classify_found() {
        let outcome = classify_probe(200, r#"{"name":"fincalc","version":"1.0"}"#);
        assert_eq!(
            outcome,
            ProbeOutcome::Found(json!({"name": "fincalc", "version": "1.0"}))
        );
    }

    #[test]
    fn test_classify_404_is_not_found() {
        // Absence of a discovery endpoint is a valid outcome, not an error
        assert_eq!(classify_probe(404, "Not Found"), ProbeOutcome::NotFound(404));
    }

    #[test]
    fn test_classify_non_json_body_is_error() {
        let outcome = classify_probe(200, "<html>hi</html>");
        assert!(matches!(outcome, ProbeOutcome::Error(_)));
    }

    #[test]
    fn test_well_known_paths_are_in_probe_order() {
        assert_eq!(WELL_KNOWN_PATHS.len(), 4);
        assert_eq!(WELL_KNOWN_PATHS[0], "/.well-known/oauth-protected-resource");
        assert_eq!(WELL_KNOWN_PATHS[3], "/mcp/.well-known/oauth-protected-resource");
    }

    #[tokio::test]
    async fn test_probe_unroutable_host_is_error_outcome() {
        let prober = DiscoveryProber::with_timeout(Duration::from_millis(200)).unwrap();
        // One unreachable probe must not abort the sweep
        let results = prober
            .probe("http://192.0.2.1:9", &["/.well-known/mcp-server"])
            .await;

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].outcome, ProbeOutcome::Error(_)));
    }
}
