//! Transport layer
//!
//! The transport is responsible only for moving a JSON-RPC request to the
//! server and handing back either a parsed envelope or a structured
//! [`TransportError`]. Protocol concerns (envelope construction) live in the
//! protocol layer; pass/fail classification lives in the suite.
//!
//! The [`Transport`] trait is the seam the test suite is written against: a
//! scripted fake transport substitutes for real networking in unit tests.
//!
//! There is deliberately no retry. Each call is a one-shot conformance probe
//! and any failure is terminal for that single test case.

use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Default timeout for protocol calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ways a single request/response exchange can fail.
///
/// `ProtocolViolation` is a conformance finding about the server, not a
/// harness fault: the body was valid JSON but broke the JSON-RPC envelope
/// rules.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection-level failure: refused, DNS, timeout
    #[error("connection failed: {0}")]
    Connection(String),

    /// Server answered outside [200, 300); raw body preserved for diagnostics
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 2xx response whose body is not valid JSON
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),

    /// Valid JSON that breaks the JSON-RPC envelope rules
    /// (both/neither of result and error, or a bad id echo)
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Transport seam for the test suite.
///
/// One method: send a request, get back the parsed response or a structured
/// error. `&self` so a single transport can serve the whole run.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a JSON-RPC request and return the validated response envelope.
    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;
}

/// HTTP transport: one POST per request, `Content-Type: application/json`.
pub struct HttpTransport {
    /// Reqwest HTTP client
    client: reqwest::Client,

    /// Endpoint URL
    url: String,

    /// Request timeout
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL with the default
    /// 30 second timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a transport with an explicit timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let url = url.into();

        // Reject anything that is not an absolute http(s) URL up front so the
        // failure is attributable to configuration rather than the network.
        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| TransportError::Connection(format!("invalid URL {}: {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TransportError::Connection(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Endpoint URL this transport posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        tracing::debug!(url = %self.url, method = %request.method, id = request.id, "sending JSON-RPC request");

        let http_response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Connection(describe_reqwest_error(&e)))?;

        let status = http_response.status().as_u16();
        let body = http_response
            .text()
            .await
            .map_err(|e| TransportError::Connection(describe_reqwest_error(&e)))?;

        tracing::debug!(status, body_len = body.len(), "received HTTP response");

        decode_response(status, &body, request.id)
    }
}

/// Decode an HTTP status + body into a validated JSON-RPC envelope.
///
/// Pure function so status/body classification is testable without a network:
/// non-2xx preserves the raw body, invalid JSON is `MalformedBody`, and a
/// parsed envelope that fails validation is `ProtocolViolation`.
pub fn decode_response(
    status: u16,
    body: &str,
    expected_id: u64,
) -> Result<JsonRpcResponse, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }

    let response: JsonRpcResponse = serde_json::from_str(body)
        .map_err(|e| TransportError::MalformedBody(e.to_string()))?;

    response
        .validate(expected_id)
        .map_err(TransportError::ProtocolViolation)?;

    Ok(response)
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JsonRpcRequest;

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new("https://example.com/mcp").unwrap();
        assert_eq!(transport.url(), "https://example.com/mcp");
        assert_eq!(transport.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_http_transport_with_timeout() {
        let transport =
            HttpTransport::with_timeout("https://example.com/mcp", Duration::from_secs(10))
                .unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_http_transport_rejects_relative_url() {
        let result = HttpTransport::new("/mcp");
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }

    #[test]
    fn test_http_transport_rejects_non_http_scheme() {
        let result = HttpTransport::new("ftp://example.com/mcp");
        let err = result.err().unwrap();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn test_decode_success() {
        let body = r#"{"jsonrpc":"2.0","id":3,"result":{"monthlyPayment":1896.20}}"#;
        let resp = decode_response(200, body, 3).unwrap();
        assert!(resp.is_success());
    }

    #[test]
    fn test_decode_rpc_error_is_not_transport_error() {
        // An error envelope is a valid response at the transport level;
        // the suite classifies it as a test failure.
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#;
        let resp = decode_response(200, body, 1).unwrap();
        assert!(!resp.is_success());
    }

    #[test]
    fn test_decode_http_error_preserves_body() {
        let err = decode_response(500, r#"{"error":"internal"}"#, 1).unwrap_err();
        match err {
            TransportError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, r#"{"error":"internal"}"#);
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_response(200, "not json at all", 1).unwrap_err();
        assert!(matches!(err, TransportError::MalformedBody(_)));
    }

    #[test]
    fn test_decode_empty_envelope_is_violation() {
        let err = decode_response(200, r#"{"jsonrpc":"2.0","id":5}"#, 5).unwrap_err();
        match err {
            TransportError::ProtocolViolation(reason) => {
                assert!(reason.contains("neither result nor error"));
            }
            other => panic!("expected ProtocolViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_id_mismatch_is_violation() {
        let err = decode_response(200, r#"{"jsonrpc":"2.0","id":9,"result":{}}"#, 5).unwrap_err();
        assert!(matches!(err, TransportError::ProtocolViolation(_)));
    }

    #[test]
    fn test_transport_trait_is_object_safe() {
        fn assert_dyn(_: &dyn Transport) {}
        let transport = HttpTransport::new("http://localhost:3000/mcp").unwrap();
        assert_dyn(&transport);
    }

    #[tokio::test]
    async fn test_send_to_unroutable_host_is_connection_error() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let transport = HttpTransport::with_timeout(
            "http://192.0.2.1:9/mcp",
            Duration::from_millis(200),
        )
        .unwrap();

        let request = JsonRpcRequest::empty(1, "initialize");
        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
