//! mcp-probe
//!
//! Conformance-test harness for JSON-RPC 2.0 (MCP) tool endpoints over HTTP.
//!
//! The harness is organized in layers:
//!
//! 1. **Protocol** (`protocol`): JSON-RPC 2.0 envelope types and validation
//! 2. **Transport** (`transport`): HTTP POST transport behind a mockable trait
//! 3. **Discovery** (`discovery`): well-known endpoint prober (informational)
//! 4. **Suite** (`suite`): declarative protocol test cases and runner
//! 5. **Responses adapter** (`responses`): the same tool calls driven through
//!    the OpenAI Responses API's MCP tool proxy
//! 6. **Report** (`report`): human-readable rendering and overall status

pub mod config;
pub mod discovery;
pub mod protocol;
pub mod report;
pub mod responses;
pub mod suite;
pub mod transport;

// Re-export the types a driver needs
pub use config::HarnessConfig;
pub use discovery::{DiscoveryProber, ProbeOutcome, ProbeResult, WELL_KNOWN_PATHS};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, RpcError, JSONRPC_VERSION};
pub use responses::{OrchestratorError, PromptOutcome, ResponsesClient, ResponsesConfig};
pub use suite::{builtin_cases, run_all, CaseOutcome, Report, TestCase, TestResult};
pub use transport::{HttpTransport, Transport, TransportError};
