use crate::api_types::{AnthropicContent, AnthropicImageSource, AnthropicMessage};
use inferkit_provider::ProviderError;
use inferkit_provider::language_model::data_content::DataContent;
use inferkit_provider::language_model::prompt::{AssistantPart, Message, Prompt, UserPart};

/// The converted prompt: the system instruction (a top-level request
/// field, not a message) plus alternating user/assistant turns.
pub struct ConvertedPrompt {
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
}

/// Convert a canonical prompt into the Messages API shape.
///
/// Tool results ride inside user messages as `tool_result` blocks, and
/// consecutive same-role messages are merged so the conversation keeps the
/// strict user/assistant alternation the API requires.
pub fn convert_to_anthropic_messages(prompt: &Prompt) -> Result<ConvertedPrompt, ProviderError> {
    let mut system = None;
    let mut messages: Vec<AnthropicMessage> = Vec::new();

    let mut push = |role: &'static str, content: Vec<AnthropicContent>| {
        if let Some(last) = messages.last_mut() {
            if last.role == role {
                last.content.extend(content);
                return;
            }
        }
        messages.push(AnthropicMessage { role, content });
    };

    for message in prompt {
        match message {
            Message::System(message) => {
                system = Some(message.content.clone());
            }

            Message::User(user) => {
                let mut content = Vec::with_capacity(user.content.len());
                for part in &user.content {
                    match part {
                        UserPart::Text(text) => {
                            content.push(AnthropicContent::Text {
                                text: text.text.clone(),
                            });
                        }
                        UserPart::File(file) => {
                            if !file.media_type.starts_with("image/") {
                                return Err(ProviderError::invalid_prompt(format!(
                                    "unsupported file media type for the Messages API: {}",
                                    file.media_type
                                )));
                            }
                            let source = match &file.data {
                                DataContent::Url(url) => AnthropicImageSource::Url {
                                    url: url.to_string(),
                                },
                                data => AnthropicImageSource::Base64 {
                                    media_type: file.media_type.clone(),
                                    data: data.to_base64().unwrap_or_default(),
                                },
                            };
                            content.push(AnthropicContent::Image { source });
                        }
                    }
                }
                push("user", content);
            }

            Message::Assistant(assistant) => {
                let mut content = Vec::with_capacity(assistant.content.len());
                for part in &assistant.content {
                    match part {
                        AssistantPart::Text(text) => {
                            content.push(AnthropicContent::Text {
                                text: text.text.clone(),
                            });
                        }
                        AssistantPart::ToolCall(call) => {
                            content.push(AnthropicContent::ToolUse {
                                id: call.tool_call_id.clone(),
                                name: call.tool_name.clone(),
                                input: call.input.clone(),
                            });
                        }
                        // Reasoning is not replayed; files have no
                        // assistant-side wire form.
                        AssistantPart::Reasoning(_) | AssistantPart::File(_) => {}
                    }
                }
                push("assistant", content);
            }

            Message::Tool(tool) => {
                let content = tool
                    .content
                    .iter()
                    .map(|result| AnthropicContent::ToolResult {
                        tool_use_id: result.tool_call_id.clone(),
                        content: result.output.to_text(),
                        is_error: result.output.is_error().then_some(true),
                    })
                    .collect();
                push("user", content);
            }
        }
    }

    Ok(ConvertedPrompt { system, messages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferkit_provider::language_model::content::ToolResultOutput;
    use inferkit_provider::language_model::prompt::{FilePart, UserMessage};

    #[test]
    fn system_becomes_a_top_level_field() {
        let converted = convert_to_anthropic_messages(&vec![
            Message::system("Be terse."),
            Message::user("2+2"),
        ])
        .unwrap();
        assert_eq!(converted.system.as_deref(), Some("Be terse."));
        assert_eq!(converted.messages.len(), 1);
        assert_eq!(converted.messages[0].role, "user");
    }

    #[test]
    fn tool_results_ride_in_user_messages() {
        let converted = convert_to_anthropic_messages(&vec![
            Message::user("weather?"),
            Message::tool_result(
                "toolu_1",
                "get_weather",
                ToolResultOutput::Text {
                    value: "sunny".into(),
                },
            ),
        ])
        .unwrap();
        // The tool result merged into a user turn.
        let value = serde_json::to_value(&converted.messages).unwrap();
        assert_eq!(value[0]["role"], "user");
        assert_eq!(value[0]["content"][1]["type"], "tool_result");
        assert_eq!(value[0]["content"][1]["content"], "sunny");
    }

    #[test]
    fn error_results_set_the_flag() {
        let converted = convert_to_anthropic_messages(&vec![
            Message::user("go"),
            Message::tool_result(
                "toolu_2",
                "lookup",
                ToolResultOutput::ErrorText {
                    value: "not found".into(),
                },
            ),
        ])
        .unwrap();
        let value = serde_json::to_value(&converted.messages).unwrap();
        assert_eq!(value[0]["content"][1]["is_error"], true);
    }

    #[test]
    fn image_bytes_become_base64_sources() {
        let prompt = vec![Message::User(UserMessage {
            content: vec![UserPart::File(FilePart::new(
                DataContent::Bytes(vec![1, 2, 3]),
                "image/png",
            ))],
            provider_options: None,
        })];
        let converted = convert_to_anthropic_messages(&prompt).unwrap();
        let value = serde_json::to_value(&converted.messages).unwrap();
        assert_eq!(value[0]["content"][0]["source"]["type"], "base64");
        assert_eq!(value[0]["content"][0]["source"]["data"], "AQID");
        assert_eq!(value[0]["content"][0]["source"]["media_type"], "image/png");
    }
}
