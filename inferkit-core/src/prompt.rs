//! Prompt validation, run before any network call.

use inferkit_provider::ProviderError;
use inferkit_provider::language_model::prompt::{AssistantPart, Message, Prompt};
use std::collections::HashSet;

/// Validate the structural invariants of a prompt.
///
/// - the prompt must not be empty
/// - a system message may appear at most once, and only at index 0
/// - every tool result must answer a tool-call id that appeared in an
///   earlier assistant message
///
/// Structural problems are configuration errors; a dangling tool-result
/// reference is a validation error.
pub fn validate_prompt(prompt: &Prompt) -> Result<(), ProviderError> {
    if prompt.is_empty() {
        return Err(ProviderError::invalid_prompt("prompt must not be empty"));
    }

    let mut seen_tool_call_ids: HashSet<&str> = HashSet::new();

    for (index, message) in prompt.iter().enumerate() {
        match message {
            Message::System(_) => {
                if index != 0 {
                    return Err(ProviderError::invalid_prompt(
                        "a system message must be the first message",
                    ));
                }
            }
            Message::Assistant(assistant) => {
                let mut turn_ids: HashSet<&str> = HashSet::new();
                for part in &assistant.content {
                    if let AssistantPart::ToolCall(call) = part {
                        if !turn_ids.insert(call.tool_call_id.as_str()) {
                            return Err(ProviderError::invalid_prompt(format!(
                                "duplicate tool call id '{}' within one assistant message",
                                call.tool_call_id
                            )));
                        }
                        seen_tool_call_ids.insert(call.tool_call_id.as_str());
                    }
                }
            }
            Message::Tool(tool) => {
                for result in &tool.content {
                    if !seen_tool_call_ids.contains(result.tool_call_id.as_str()) {
                        return Err(ProviderError::type_validation(
                            result.tool_call_id.clone(),
                            format!(
                                "tool result references unknown tool call id '{}'",
                                result.tool_call_id
                            ),
                        ));
                    }
                }
            }
            Message::User(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferkit_provider::language_model::content::ToolResultOutput;
    use inferkit_provider::language_model::prompt::{AssistantMessage, ToolCallPart};
    use serde_json::json;

    fn assistant_with_call(id: &str) -> Message {
        Message::Assistant(AssistantMessage {
            content: vec![AssistantPart::ToolCall(ToolCallPart {
                tool_call_id: id.into(),
                tool_name: "lookup".into(),
                input: json!({}),
                provider_options: None,
            })],
            provider_options: None,
        })
    }

    #[test]
    fn empty_prompt_is_a_configuration_error() {
        let err = validate_prompt(&vec![]).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPrompt { .. }));
    }

    #[test]
    fn system_message_must_be_first() {
        let prompt = vec![Message::user("hi"), Message::system("late system")];
        let err = validate_prompt(&prompt).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPrompt { .. }));
    }

    #[test]
    fn leading_system_message_is_fine() {
        let prompt = vec![Message::system("be brief"), Message::user("hi")];
        assert!(validate_prompt(&prompt).is_ok());
    }

    #[test]
    fn tool_result_must_answer_a_known_call() {
        let prompt = vec![
            Message::user("hi"),
            Message::tool_result("call_404", "lookup", ToolResultOutput::Text { value: "x".into() }),
        ];
        let err = validate_prompt(&prompt).unwrap_err();
        assert!(matches!(err, ProviderError::TypeValidation { .. }));
    }

    #[test]
    fn tool_result_after_matching_call_is_fine() {
        let prompt = vec![
            Message::user("hi"),
            assistant_with_call("call_1"),
            Message::tool_result("call_1", "lookup", ToolResultOutput::Text { value: "x".into() }),
        ];
        assert!(validate_prompt(&prompt).is_ok());
    }

    #[test]
    fn duplicate_ids_in_one_turn_are_rejected() {
        let prompt = vec![
            Message::user("hi"),
            Message::Assistant(AssistantMessage {
                content: vec![
                    AssistantPart::ToolCall(ToolCallPart {
                        tool_call_id: "call_1".into(),
                        tool_name: "a".into(),
                        input: json!({}),
                        provider_options: None,
                    }),
                    AssistantPart::ToolCall(ToolCallPart {
                        tool_call_id: "call_1".into(),
                        tool_name: "b".into(),
                        input: json!({}),
                        provider_options: None,
                    }),
                ],
                provider_options: None,
            }),
        ];
        assert!(validate_prompt(&prompt).is_err());
    }
}
