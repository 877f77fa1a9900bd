use crate::api_types::{
    GoogleContent, GoogleFileData, GoogleFunctionCall, GoogleFunctionResponse, GoogleInlineData,
    GooglePart,
};
use inferkit_provider::ProviderError;
use inferkit_provider::language_model::content::ToolResultOutput;
use inferkit_provider::language_model::data_content::DataContent;
use inferkit_provider::language_model::prompt::{AssistantPart, Message, Prompt, UserPart};
use serde_json::json;

/// The converted prompt: a separate system instruction plus user/model
/// turns.
pub struct ConvertedPrompt {
    pub system_instruction: Option<GoogleContent>,
    pub contents: Vec<GoogleContent>,
}

/// Convert a canonical prompt to the GenerateContent shape.
///
/// Roles are `user` and `model`; tool results become `functionResponse`
/// parts in a user turn; inline file data rides as base64 `inlineData` and
/// URL references as `fileData`.
pub fn convert_to_google_contents(prompt: &Prompt) -> Result<ConvertedPrompt, ProviderError> {
    let mut system_instruction = None;
    let mut contents: Vec<GoogleContent> = Vec::new();

    for message in prompt {
        match message {
            Message::System(system) => {
                system_instruction = Some(GoogleContent {
                    role: "user",
                    parts: vec![GooglePart::text(system.content.clone())],
                });
            }

            Message::User(user) => {
                let mut parts = Vec::with_capacity(user.content.len());
                for part in &user.content {
                    match part {
                        UserPart::Text(text) => parts.push(GooglePart::text(text.text.clone())),
                        UserPart::File(file) => match &file.data {
                            DataContent::Url(url) => parts.push(GooglePart {
                                file_data: Some(GoogleFileData {
                                    file_uri: url.to_string(),
                                    mime_type: file.media_type.clone(),
                                }),
                                ..Default::default()
                            }),
                            data => parts.push(GooglePart {
                                inline_data: Some(GoogleInlineData {
                                    mime_type: file.media_type.clone(),
                                    data: data.to_base64().unwrap_or_default(),
                                }),
                                ..Default::default()
                            }),
                        },
                    }
                }
                contents.push(GoogleContent {
                    role: "user",
                    parts,
                });
            }

            Message::Assistant(assistant) => {
                let mut parts = Vec::with_capacity(assistant.content.len());
                for part in &assistant.content {
                    match part {
                        AssistantPart::Text(text) => {
                            parts.push(GooglePart::text(text.text.clone()));
                        }
                        AssistantPart::Reasoning(reasoning) => {
                            parts.push(GooglePart {
                                text: Some(reasoning.text.clone()),
                                thought: Some(true),
                                ..Default::default()
                            });
                        }
                        AssistantPart::ToolCall(call) => {
                            parts.push(GooglePart {
                                function_call: Some(GoogleFunctionCall {
                                    name: call.tool_name.clone(),
                                    args: call.input.clone(),
                                }),
                                ..Default::default()
                            });
                        }
                        AssistantPart::File(_) => {
                            return Err(ProviderError::invalid_prompt(
                                "assistant file parts have no GenerateContent form",
                            ));
                        }
                    }
                }
                contents.push(GoogleContent {
                    role: "model",
                    parts,
                });
            }

            Message::Tool(tool) => {
                let parts = tool
                    .content
                    .iter()
                    .map(|result| {
                        let response = match &result.output {
                            ToolResultOutput::Json { value }
                            | ToolResultOutput::ErrorJson { value } => value.clone(),
                            output => json!({"result": output.to_text()}),
                        };
                        GooglePart {
                            function_response: Some(GoogleFunctionResponse {
                                name: result.tool_name.clone(),
                                response,
                            }),
                            ..Default::default()
                        }
                    })
                    .collect();
                contents.push(GoogleContent {
                    role: "user",
                    parts,
                });
            }
        }
    }

    Ok(ConvertedPrompt {
        system_instruction,
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferkit_provider::language_model::prompt::{FilePart, UserMessage};

    #[test]
    fn roles_map_to_user_and_model() {
        let converted = convert_to_google_contents(&vec![
            Message::system("Be terse."),
            Message::user("hello"),
            Message::assistant("hi"),
        ])
        .unwrap();

        assert!(converted.system_instruction.is_some());
        assert_eq!(converted.contents.len(), 2);
        assert_eq!(converted.contents[0].role, "user");
        assert_eq!(converted.contents[1].role, "model");
    }

    #[test]
    fn inline_bytes_and_urls_take_different_forms() {
        let prompt = vec![Message::User(UserMessage {
            content: vec![
                UserPart::File(FilePart::new(DataContent::Bytes(vec![1, 2, 3]), "image/png")),
                UserPart::File(FilePart::new(
                    DataContent::Url("https://files.example.com/doc.pdf".parse().unwrap()),
                    "application/pdf",
                )),
            ],
            provider_options: None,
        })];
        let converted = convert_to_google_contents(&prompt).unwrap();
        let value = serde_json::to_value(&converted.contents).unwrap();
        assert_eq!(value[0]["parts"][0]["inlineData"]["data"], "AQID");
        assert_eq!(
            value[0]["parts"][1]["fileData"]["fileUri"],
            "https://files.example.com/doc.pdf"
        );
    }

    #[test]
    fn tool_results_become_function_responses() {
        let converted = convert_to_google_contents(&vec![
            Message::user("weather?"),
            Message::tool_result(
                "call_1",
                "get_weather",
                ToolResultOutput::Json {
                    value: json!({"temp": 21}),
                },
            ),
        ])
        .unwrap();
        let value = serde_json::to_value(&converted.contents).unwrap();
        assert_eq!(value[1]["role"], "user");
        assert_eq!(
            value[1]["parts"][0]["functionResponse"]["name"],
            "get_weather"
        );
        assert_eq!(
            value[1]["parts"][0]["functionResponse"]["response"]["temp"],
            21
        );
    }
}
