use crate::chat::api_types::{WireFunctionDefinition, WireTool};
use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::language_model::tool::Tool;
use inferkit_provider::language_model::tool_choice::ToolChoice;
use serde_json::{Value, json};

/// The tools/tool_choice pair in wire form, with warnings for anything
/// that had to be dropped.
pub struct PreparedTools {
    pub tools: Option<Vec<WireTool>>,
    pub tool_choice: Option<Value>,
    pub warnings: Vec<CallWarning>,
}

/// Map canonical tools and tool choice to the chat-completions shape.
///
/// Provider-defined tools have no generic wire form here and are dropped
/// with a warning; provider crates that support them translate them before
/// this point.
pub fn prepare_tools(tools: Option<&[Tool]>, tool_choice: Option<&ToolChoice>) -> PreparedTools {
    let mut warnings = Vec::new();
    let mut wire_tools = Vec::new();

    for tool in tools.unwrap_or_default() {
        match tool {
            Tool::Function(function) => wire_tools.push(WireTool {
                kind: "function".to_string(),
                function: WireFunctionDefinition {
                    name: function.name.clone(),
                    description: function.description.clone(),
                    parameters: function.input_schema.clone(),
                },
            }),
            Tool::ProviderDefined(tool) => {
                warnings.push(CallWarning::unsupported_tool(tool.name.clone()));
            }
        }
    }

    let wire_choice = tool_choice.map(|choice| match choice {
        ToolChoice::Auto => json!("auto"),
        ToolChoice::Required => json!("required"),
        ToolChoice::None => json!("none"),
        ToolChoice::Tool { tool_name } => json!({
            "type": "function",
            "function": {"name": tool_name}
        }),
    });

    PreparedTools {
        tools: if wire_tools.is_empty() {
            None
        } else {
            Some(wire_tools)
        },
        tool_choice: wire_choice,
        warnings,
    }
}
