//! MCP protocol types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The protocol version this client speaks.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Versions the client accepts from a server.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Client or server implementation info exchanged during initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    /// Implementation name.
    pub name: String,
    /// Implementation version.
    pub version: String,
}

/// Capabilities advertised by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tool support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    /// Prompt support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Value>,
    /// Resource support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
    /// Logging support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<Value>,
}

/// Result of the `initialize` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version the server selected.
    pub protocol_version: String,
    /// Server capabilities.
    #[serde(default)]
    pub capabilities: ServerCapabilities,
    /// Server implementation info.
    pub server_info: Implementation,
    /// Optional usage instructions.
    #[serde(default)]
    pub instructions: Option<String>,
}

/// One tool as listed by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct McpToolDefinition {
    /// Tool name, used in `tools/call`.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema of the tool's arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result of `tools/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsResult {
    /// The advertised tools.
    pub tools: Vec<McpToolDefinition>,
    /// Pagination cursor, when more tools exist.
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,
}

/// One content item in a tool-call result.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CallToolContent {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// A base64 image.
    Image {
        /// Base64 payload.
        data: String,
        /// MIME type.
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    /// An embedded resource.
    Resource {
        /// The resource contents.
        resource: Value,
    },
}

/// Result of `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    /// The result content items.
    #[serde(default)]
    pub content: Vec<CallToolContent>,
    /// Whether the tool reported a failure.
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Join the content items into one text, JSON-encoding non-text items.
    pub fn to_text(&self) -> String {
        self.content
            .iter()
            .map(|item| match item {
                CallToolContent::Text { text } => text.clone(),
                CallToolContent::Image { mime_type, .. } => {
                    format!("[image: {mime_type}]")
                }
                CallToolContent::Resource { resource } => {
                    serde_json::to_string(resource).unwrap_or_default()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
