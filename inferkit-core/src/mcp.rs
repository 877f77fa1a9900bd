//! Model Context Protocol client.
//!
//! A minimal MCP client focused on tool discovery and invocation: JSON-RPC
//! 2.0 over a pluggable transport (a stdio subprocess or an SSE
//! connection), the `initialize`/`initialized` handshake, `tools/list`
//! enumeration and per-invocation `tools/call`. Each discovered tool
//! carries its JSON Schema and an executor that unpacks the call result
//! into text.
//!
//! Deliberately unsupported: sampling/roots client capabilities, server
//! notifications, session resumption.

pub mod client;
pub mod json_rpc;
pub mod sse;
pub mod stdio;
pub mod transport;
pub mod types;

pub use client::{McpClient, McpTool};
pub use sse::SseTransport;
pub use stdio::{StdioConfig, StdioTransport};
pub use transport::{McpError, McpTransport};
pub use types::{LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS};
