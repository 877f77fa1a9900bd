use serde::{Deserialize, Serialize};

/// How the model should select tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    Auto,
    /// The model must call some tool.
    Required,
    /// The model must not call any tool.
    None,
    /// The model must call the named tool.
    #[serde(rename_all = "camelCase")]
    Tool {
        /// The tool to call.
        tool_name: String,
    },
}
