//! JSON-RPC 2.0 envelope types
//!
//! The harness speaks plain JSON-RPC 2.0 over HTTP POST, which is what the
//! MCP transport layer is built on.
//!
//! # Protocol Specification
//!
//! - JSON-RPC 2.0: <https://www.jsonrpc.org/specification>
//! - MCP Spec: <https://modelcontextprotocol.io/specification/2025-03-26>
//!
//! # Design
//!
//! Requests are strict: the harness always emits a well-formed envelope with a
//! `params` object (possibly empty). Responses are deserialized leniently,
//! with every field optional, because a malformed envelope from the server
//! under test is a conformance finding to report, not a crash. The
//! [`JsonRpcResponse::validate`] check enforces the envelope rules after
//! parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request message
///
/// # Example
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "id": 2,
///   "method": "tools/list",
///   "params": {}
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier; a conforming server must echo it unmodified
    pub id: u64,

    /// Method name to invoke
    pub method: String,

    /// Method parameters; always serialized, `{}` when the method takes none
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a new request with the given id, method, and params object.
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Create a request with an empty params object.
    pub fn empty(id: u64, method: impl Into<String>) -> Self {
        Self::new(id, method, serde_json::json!({}))
    }
}

/// A JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcError {
    /// Error code (JSON-RPC defined or server-specific)
    pub code: i64,

    /// Human-readable error message
    pub message: String,

    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Error {}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// A JSON-RPC 2.0 response envelope, parsed leniently.
///
/// A conforming response carries exactly one of `result`/`error` and echoes
/// the request id. Neither property is assumed here; call
/// [`validate`](Self::validate) to check them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    /// JSON-RPC version as sent by the server, if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,

    /// Response id as sent by the server; must match the request id.
    /// Kept as a raw JSON value so a wrong-typed id is a reportable
    /// violation rather than a parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Result payload (present on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error object (present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// Check the envelope against the JSON-RPC 2.0 rules for a response to
    /// the request with `expected_id`.
    ///
    /// Returns a human-readable description of the violation, if any:
    /// both or neither of `result`/`error` present, or a missing/mismatched id.
    pub fn validate(&self, expected_id: u64) -> Result<(), String> {
        match (&self.result, &self.error) {
            (Some(_), Some(_)) => {
                return Err("response carries both result and error".to_string());
            }
            (None, None) => {
                return Err("response carries neither result nor error".to_string());
            }
            _ => {}
        }

        match &self.id {
            Some(id) if *id == Value::from(expected_id) => Ok(()),
            Some(id) => Err(format!(
                "response id {} does not match request id {}",
                id, expected_id
            )),
            None => Err("response is missing an id".to_string()),
        }
    }

    /// Whether the response carries a `result` (and no `error`).
    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }
}
