use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the MCP client and its transports.
#[derive(Debug, Error)]
pub enum McpError {
    /// The transport failed to start, send or receive.
    #[error("MCP transport error: {message}")]
    Transport {
        /// What went wrong.
        message: String,
    },

    /// A request received no response within the per-request timeout.
    #[error("MCP request '{method}' timed out")]
    Timeout {
        /// The method that timed out.
        method: String,
    },

    /// The server answered with a JSON-RPC error.
    #[error("MCP server error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Server-supplied message.
        message: String,
    },

    /// The server violated the protocol.
    #[error("MCP protocol error: {message}")]
    Protocol {
        /// What went wrong.
        message: String,
    },

    /// A tool reported a failure result.
    #[error("MCP tool '{tool}' failed: {message}")]
    Tool {
        /// The tool name.
        tool: String,
        /// The failure text.
        message: String,
    },

    /// The client has been closed.
    #[error("MCP client is closed")]
    Closed,
}

impl McpError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

/// A bidirectional JSON message channel to an MCP server.
///
/// `start` hands back the receiving side: every JSON message the server
/// produces arrives on the channel. `send` delivers one message to the
/// server. Implementations exist for stdio subprocesses and SSE.
#[async_trait]
pub trait McpTransport: Send {
    /// Start the transport and return the incoming message channel.
    async fn start(&mut self) -> Result<mpsc::Receiver<Value>, McpError>;

    /// Send one message to the server.
    async fn send(&mut self, message: Value) -> Result<(), McpError>;

    /// Tear the transport down.
    async fn close(&mut self) -> Result<(), McpError>;
}
