use crate::chat::api_types::{
    WireContentPart, WireFunctionCall, WireImageUrl, WireMessage, WireToolCall, WireUserContent,
};
use inferkit_provider::ProviderError;
use inferkit_provider::language_model::prompt::{AssistantPart, Message, Prompt, UserPart};

/// Convert a canonical prompt into chat-completions wire messages.
///
/// - system messages pass through as `role: system`
/// - user file parts must be images and become `image_url` parts; inline
///   data is rendered as a data URL
/// - assistant text parts are concatenated; tool calls become the
///   `tool_calls` array with JSON-encoded argument strings
/// - each tool result becomes its own `role: tool` message
pub fn convert_to_openai_compatible_messages(
    prompt: &Prompt,
) -> Result<Vec<WireMessage>, ProviderError> {
    let mut messages = Vec::with_capacity(prompt.len());

    for message in prompt {
        match message {
            Message::System(system) => {
                messages.push(WireMessage::System {
                    content: system.content.clone(),
                });
            }

            Message::User(user) => {
                // A single text part collapses to a plain string.
                if let [UserPart::Text(text)] = user.content.as_slice() {
                    messages.push(WireMessage::User {
                        content: WireUserContent::Text(text.text.clone()),
                    });
                    continue;
                }

                let mut parts = Vec::with_capacity(user.content.len());
                for part in &user.content {
                    match part {
                        UserPart::Text(text) => {
                            parts.push(WireContentPart::Text {
                                text: text.text.clone(),
                            });
                        }
                        UserPart::File(file) => {
                            if !file.media_type.starts_with("image/") {
                                return Err(ProviderError::invalid_prompt(format!(
                                    "unsupported file media type for chat-completions: {}",
                                    file.media_type
                                )));
                            }
                            let media_type = if file.media_type == "image/*" {
                                "image/jpeg"
                            } else {
                                &file.media_type
                            };
                            parts.push(WireContentPart::ImageUrl {
                                image_url: WireImageUrl {
                                    url: file.data.to_url_string(media_type),
                                },
                            });
                        }
                    }
                }
                messages.push(WireMessage::User {
                    content: WireUserContent::Parts(parts),
                });
            }

            Message::Assistant(assistant) => {
                let mut text = String::new();
                let mut tool_calls = Vec::new();

                for part in &assistant.content {
                    match part {
                        AssistantPart::Text(part) => text.push_str(&part.text),
                        AssistantPart::ToolCall(call) => {
                            tool_calls.push(WireToolCall {
                                id: call.tool_call_id.clone(),
                                kind: "function".to_string(),
                                function: WireFunctionCall {
                                    name: call.tool_name.clone(),
                                    arguments: serde_json::to_string(&call.input)
                                        .unwrap_or_else(|_| "{}".to_string()),
                                },
                            });
                        }
                        // Reasoning and files are not replayed to the server.
                        AssistantPart::Reasoning(_) | AssistantPart::File(_) => {}
                    }
                }

                messages.push(WireMessage::Assistant {
                    content: if text.is_empty() { None } else { Some(text) },
                    tool_calls: if tool_calls.is_empty() {
                        None
                    } else {
                        Some(tool_calls)
                    },
                });
            }

            Message::Tool(tool) => {
                for result in &tool.content {
                    messages.push(WireMessage::Tool {
                        content: result.output.to_text(),
                        tool_call_id: result.tool_call_id.clone(),
                    });
                }
            }
        }
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferkit_provider::language_model::content::ToolResultOutput;
    use inferkit_provider::language_model::data_content::DataContent;
    use inferkit_provider::language_model::prompt::{
        AssistantMessage, FilePart, TextPart, ToolCallPart, UserMessage,
    };
    use serde_json::json;

    #[test]
    fn system_message_passes_through() {
        let messages =
            convert_to_openai_compatible_messages(&vec![Message::system("Be helpful.")]).unwrap();
        assert_eq!(
            serde_json::to_value(&messages[0]).unwrap(),
            json!({"role": "system", "content": "Be helpful."})
        );
    }

    #[test]
    fn single_text_user_message_collapses_to_string() {
        let messages =
            convert_to_openai_compatible_messages(&vec![Message::user("Say hi")]).unwrap();
        assert_eq!(
            serde_json::to_value(&messages[0]).unwrap(),
            json!({"role": "user", "content": "Say hi"})
        );
    }

    #[test]
    fn image_bytes_become_data_urls() {
        let prompt = vec![Message::User(UserMessage {
            content: vec![
                UserPart::Text(TextPart::new("What is this?")),
                UserPart::File(FilePart::new(
                    DataContent::Bytes(vec![1, 2, 3]),
                    "image/png",
                )),
            ],
            provider_options: None,
        })];
        let messages = convert_to_openai_compatible_messages(&prompt).unwrap();
        let value = serde_json::to_value(&messages[0]).unwrap();
        assert_eq!(
            value["content"][1]["image_url"]["url"],
            "data:image/png;base64,AQID"
        );
    }

    #[test]
    fn non_image_files_are_rejected() {
        let prompt = vec![Message::User(UserMessage {
            content: vec![UserPart::File(FilePart::new(
                DataContent::Base64("aGk=".into()),
                "application/pdf",
            ))],
            provider_options: None,
        })];
        let err = convert_to_openai_compatible_messages(&prompt).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPrompt { .. }));
    }

    #[test]
    fn assistant_tool_calls_serialize_arguments() {
        let prompt = vec![Message::Assistant(AssistantMessage {
            content: vec![AssistantPart::ToolCall(ToolCallPart {
                tool_call_id: "call_1".into(),
                tool_name: "get_weather".into(),
                input: json!({"city": "Paris"}),
                provider_options: None,
            })],
            provider_options: None,
        })];
        let messages = convert_to_openai_compatible_messages(&prompt).unwrap();
        let value = serde_json::to_value(&messages[0]).unwrap();
        assert_eq!(value["tool_calls"][0]["id"], "call_1");
        assert_eq!(value["tool_calls"][0]["function"]["name"], "get_weather");
        assert_eq!(
            value["tool_calls"][0]["function"]["arguments"],
            "{\"city\":\"Paris\"}"
        );
        assert!(value.get("content").is_none() || value["content"].is_null());
    }

    #[test]
    fn tool_results_become_tool_messages() {
        let prompt = vec![Message::tool_result(
            "call_1",
            "get_weather",
            ToolResultOutput::Json {
                value: json!({"temp": 21}),
            },
        )];
        let messages = convert_to_openai_compatible_messages(&prompt).unwrap();
        let value = serde_json::to_value(&messages[0]).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert_eq!(value["content"], "{\"temp\":21}");
    }
}
