use inferkit_provider::language_model::finish_reason::FinishReason;

/// Map an Anthropic stop reason to the canonical enum.
///
/// A stop-sequence hit folds into `Stop`; the matched sequence is still
/// available under the provider metadata for callers who need it.
pub fn map_anthropic_stop_reason(stop_reason: Option<&str>) -> FinishReason {
    match stop_reason {
        Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
        Some("max_tokens") => FinishReason::Length,
        Some("tool_use") => FinishReason::ToolCalls,
        Some("refusal") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Other,
        None => FinishReason::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_the_fixed_table() {
        assert_eq!(map_anthropic_stop_reason(Some("end_turn")), FinishReason::Stop);
        assert_eq!(
            map_anthropic_stop_reason(Some("stop_sequence")),
            FinishReason::Stop
        );
        assert_eq!(
            map_anthropic_stop_reason(Some("max_tokens")),
            FinishReason::Length
        );
        assert_eq!(
            map_anthropic_stop_reason(Some("tool_use")),
            FinishReason::ToolCalls
        );
        assert_eq!(map_anthropic_stop_reason(Some("who_knows")), FinishReason::Other);
        assert_eq!(map_anthropic_stop_reason(None), FinishReason::Unknown);
    }
}
