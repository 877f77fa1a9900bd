//! Reasoning-model parameter rules.
//!
//! The o-series models reject the classic sampling parameters, take their
//! token limit as `max_completion_tokens`, and handle system instructions
//! differently per generation: the early o1 previews drop them, later
//! models take them as `developer` messages.

use serde_json::{Value, json};

/// How a model wants its system instruction delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMessageMode {
    /// Keep `role: system`.
    System,
    /// Rewrite to `role: developer`.
    Developer,
    /// Drop system messages entirely.
    Remove,
}

/// Parameters reasoning models reject.
const UNSUPPORTED_PARAMS: &[&str] = &[
    "temperature",
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "logit_bias",
    "logprobs",
    "top_logprobs",
];

/// Whether a model id belongs to the reasoning family.
pub fn is_reasoning_model(model_id: &str) -> bool {
    model_id.starts_with("o1") || model_id.starts_with("o3") || model_id.starts_with("o4")
}

/// The system-message mode for a model id.
pub fn system_message_mode(model_id: &str) -> SystemMessageMode {
    if !is_reasoning_model(model_id) {
        return SystemMessageMode::System;
    }
    if model_id.starts_with("o1-mini") || model_id.starts_with("o1-preview") {
        SystemMessageMode::Remove
    } else {
        SystemMessageMode::Developer
    }
}

/// Rewrite an assembled chat-completions body for reasoning models.
///
/// Non-reasoning models pass through untouched.
pub fn apply_reasoning_model_rules(mut body: Value) -> Value {
    let Some(model) = body.get("model").and_then(Value::as_str) else {
        return body;
    };
    if !is_reasoning_model(model) {
        return body;
    }
    let mode = system_message_mode(model);

    if let Some(object) = body.as_object_mut() {
        for param in UNSUPPORTED_PARAMS {
            object.remove(*param);
        }
        if let Some(max_tokens) = object.remove("max_tokens") {
            object
                .entry("max_completion_tokens")
                .or_insert(max_tokens);
        }
    }

    if let Some(messages) = body.get_mut("messages").and_then(Value::as_array_mut) {
        match mode {
            SystemMessageMode::System => {}
            SystemMessageMode::Remove => {
                messages.retain(|message| message.get("role") != Some(&json!("system")));
            }
            SystemMessageMode::Developer => {
                for message in messages.iter_mut() {
                    if message.get("role") == Some(&json!("system")) {
                        message["role"] = json!("developer");
                    }
                }
            }
        }
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_model_families() {
        assert!(is_reasoning_model("o1"));
        assert!(is_reasoning_model("o1-mini-2024-09-12"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(!is_reasoning_model("gpt-4o-mini"));
    }

    #[test]
    fn strips_sampling_params_and_renames_max_tokens() {
        let body = json!({
            "model": "o1",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.7,
            "top_p": 0.9,
            "max_tokens": 500,
        });
        let rewritten = apply_reasoning_model_rules(body);
        assert!(rewritten.get("temperature").is_none());
        assert!(rewritten.get("top_p").is_none());
        assert!(rewritten.get("max_tokens").is_none());
        assert_eq!(rewritten["max_completion_tokens"], 500);
    }

    #[test]
    fn o1_takes_developer_messages() {
        let body = json!({
            "model": "o1",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "hi"}
            ],
        });
        let rewritten = apply_reasoning_model_rules(body);
        assert_eq!(rewritten["messages"][0]["role"], "developer");
    }

    #[test]
    fn o1_mini_drops_system_messages() {
        let body = json!({
            "model": "o1-mini",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "hi"}
            ],
        });
        let rewritten = apply_reasoning_model_rules(body);
        assert_eq!(rewritten["messages"].as_array().unwrap().len(), 1);
        assert_eq!(rewritten["messages"][0]["role"], "user");
    }

    #[test]
    fn other_models_are_untouched() {
        let body = json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "system", "content": "Be brief."}],
            "temperature": 0.7,
        });
        let rewritten = apply_reasoning_model_rules(body.clone());
        assert_eq!(rewritten, body);
    }
}
