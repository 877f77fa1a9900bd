use inferkit_provider::language_model::finish_reason::FinishReason;

/// Map a chat-completions finish reason string to the canonical enum.
pub fn map_openai_compatible_finish_reason(finish_reason: Option<&str>) -> FinishReason {
    match finish_reason {
        Some("stop") | Some("end_turn") => FinishReason::Stop,
        Some("length") | Some("max_tokens") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some("tool_calls") | Some("function_call") | Some("tool_use") => FinishReason::ToolCalls,
        Some(_) => FinishReason::Other,
        None => FinishReason::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_reasons() {
        assert_eq!(
            map_openai_compatible_finish_reason(Some("stop")),
            FinishReason::Stop
        );
        assert_eq!(
            map_openai_compatible_finish_reason(Some("end_turn")),
            FinishReason::Stop
        );
        assert_eq!(
            map_openai_compatible_finish_reason(Some("length")),
            FinishReason::Length
        );
        assert_eq!(
            map_openai_compatible_finish_reason(Some("max_tokens")),
            FinishReason::Length
        );
        assert_eq!(
            map_openai_compatible_finish_reason(Some("tool_calls")),
            FinishReason::ToolCalls
        );
        assert_eq!(
            map_openai_compatible_finish_reason(Some("function_call")),
            FinishReason::ToolCalls
        );
        assert_eq!(
            map_openai_compatible_finish_reason(Some("content_filter")),
            FinishReason::ContentFilter
        );
    }

    #[test]
    fn unrecognised_maps_to_other_and_absent_to_unknown() {
        assert_eq!(
            map_openai_compatible_finish_reason(Some("insufficient_system_resource")),
            FinishReason::Other
        );
        assert_eq!(
            map_openai_compatible_finish_reason(None),
            FinishReason::Unknown
        );
    }
}
