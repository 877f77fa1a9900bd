use crate::api_types::{
    ConverseContent, ConverseImage, ConverseImageSource, ConverseMessage, ConverseToolResult,
    ConverseToolUse,
};
use inferkit_provider::ProviderError;
use inferkit_provider::language_model::content::ToolResultOutput;
use inferkit_provider::language_model::prompt::{AssistantPart, Message, Prompt, UserPart};
use serde_json::json;

/// The converted prompt: a system block list plus user/assistant turns.
pub struct ConvertedPrompt {
    pub system: Vec<serde_json::Value>,
    pub messages: Vec<ConverseMessage>,
}

/// Convert a canonical prompt to the Converse shape.
pub fn convert_to_converse_messages(prompt: &Prompt) -> Result<ConvertedPrompt, ProviderError> {
    let mut system = Vec::new();
    let mut messages: Vec<ConverseMessage> = Vec::new();

    let mut push = |role: &'static str, content: Vec<ConverseContent>| {
        if let Some(last) = messages.last_mut() {
            if last.role == role {
                last.content.extend(content);
                return;
            }
        }
        messages.push(ConverseMessage { role, content });
    };

    for message in prompt {
        match message {
            Message::System(message) => {
                system.push(json!({"text": message.content}));
            }

            Message::User(user) => {
                let mut content = Vec::with_capacity(user.content.len());
                for part in &user.content {
                    match part {
                        UserPart::Text(text) => content.push(ConverseContent {
                            text: Some(text.text.clone()),
                            ..Default::default()
                        }),
                        UserPart::File(file) => {
                            let Some(format) = file.media_type.strip_prefix("image/") else {
                                return Err(ProviderError::invalid_prompt(format!(
                                    "unsupported file media type for Converse: {}",
                                    file.media_type
                                )));
                            };
                            content.push(ConverseContent {
                                image: Some(ConverseImage {
                                    format: format.to_string(),
                                    source: ConverseImageSource {
                                        bytes: file.data.to_base64().unwrap_or_default(),
                                    },
                                }),
                                ..Default::default()
                            });
                        }
                    }
                }
                push("user", content);
            }

            Message::Assistant(assistant) => {
                let mut content = Vec::with_capacity(assistant.content.len());
                for part in &assistant.content {
                    match part {
                        AssistantPart::Text(text) => content.push(ConverseContent {
                            text: Some(text.text.clone()),
                            ..Default::default()
                        }),
                        AssistantPart::ToolCall(call) => content.push(ConverseContent {
                            tool_use: Some(ConverseToolUse {
                                tool_use_id: call.tool_call_id.clone(),
                                name: call.tool_name.clone(),
                                input: call.input.clone(),
                            }),
                            ..Default::default()
                        }),
                        AssistantPart::Reasoning(_) | AssistantPart::File(_) => {}
                    }
                }
                push("assistant", content);
            }

            Message::Tool(tool) => {
                let content = tool
                    .content
                    .iter()
                    .map(|result| {
                        let payload = match &result.output {
                            ToolResultOutput::Json { value }
                            | ToolResultOutput::ErrorJson { value } => json!({"json": value}),
                            output => json!({"text": output.to_text()}),
                        };
                        ConverseContent {
                            tool_result: Some(ConverseToolResult {
                                tool_use_id: result.tool_call_id.clone(),
                                content: vec![payload],
                                status: result.output.is_error().then_some("error"),
                            }),
                            ..Default::default()
                        }
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
    use inferkit_provider::language_model::data_content::DataContent;
    use inferkit_provider::language_model::prompt::{FilePart, UserMessage};

    #[test]
    fn system_content_lands_in_the_system_array() {
        let converted = convert_to_converse_messages(&vec![
            Message::system("Be brief."),
            Message::user("hi"),
        ])
        .unwrap();
        assert_eq!(converted.system, vec![json!({"text": "Be brief."})]);
        assert_eq!(converted.messages.len(), 1);
    }

    #[test]
    fn images_become_byte_blocks_with_bare_formats() {
        let prompt = vec![Message::User(UserMessage {
            content: vec![UserPart::File(FilePart::new(
                DataContent::Bytes(vec![9, 9]),
                "image/png",
            ))],
            provider_options: None,
        })];
        let converted = convert_to_converse_messages(&prompt).unwrap();
        let value = serde_json::to_value(&converted.messages).unwrap();
        assert_eq!(value[0]["content"][0]["image"]["format"], "png");
        assert_eq!(value[0]["content"][0]["image"]["source"]["bytes"], "CQk=");
    }

    #[test]
    fn tool_results_carry_json_payloads_and_status() {
        let converted = convert_to_converse_messages(&vec![
            Message::user("run"),
            Message::tool_result(
                "toolu_1",
                "lookup",
                ToolResultOutput::ErrorJson {
                    value: json!({"reason": "missing"}),
                },
            ),
        ])
        .unwrap();
        let value = serde_json::to_value(&converted.messages).unwrap();
        let result = &value[0]["content"][1]["toolResult"];
        assert_eq!(result["toolUseId"], "toolu_1");
        assert_eq!(result["content"][0]["json"]["reason"], "missing");
        assert_eq!(result["status"], "error");
    }
}
