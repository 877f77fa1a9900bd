use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Tool {
    /// A caller-defined function tool.
    Function(FunctionTool),
    /// A tool defined and executed by the provider itself.
    ProviderDefined(ProviderDefinedTool),
}

/// A function tool with a JSON Schema parameter description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    /// Tool name, unique among the tools of one request.
    pub name: String,
    /// Human-readable description shown to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the argument object.
    pub input_schema: Value,
}

/// A provider-defined tool, identified by the provider's tool id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDefinedTool {
    /// Provider-scoped tool id, e.g. `"openai.web_search"`.
    pub id: String,
    /// Name the tool is exposed under in this request.
    pub name: String,
    /// Provider-specific configuration arguments.
    pub args: Value,
}

impl Tool {
    /// Create a function tool.
    pub fn function(
        name: impl Into<String>,
        description: Option<String>,
        input_schema: Value,
    ) -> Self {
        Self::Function(FunctionTool {
            name: name.into(),
            description,
            input_schema,
        })
    }

    /// The name of this tool.
    pub fn name(&self) -> &str {
        match self {
            Self::Function(tool) => &tool.name,
            Self::ProviderDefined(tool) => &tool.name,
        }
    }
}
