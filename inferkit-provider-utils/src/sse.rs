//! Decoders for streamed response bodies.
//!
//! Providers stream in one of two framings: Server-Sent Events (`data: `
//! lines, optional `event:` types, blank-line dispatch) or newline-delimited
//! JSON. Both decoders work on the raw byte stream and yield items as soon
//! as a complete frame has arrived, without buffering the body.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use inferkit_provider::ProviderError;
use serde_json::Value;

/// One Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SseEvent {
    /// The `event:` field, when the server sent one.
    pub event: Option<String>,
    /// The `data:` payload. Multiple data lines are joined with newlines.
    pub data: String,
}

/// Split a byte stream into text lines.
///
/// Lines are dispatched as soon as their terminating newline arrives; a
/// trailing unterminated line is flushed when the stream ends. Carriage
/// returns are stripped.
pub fn lines(
    byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = Result<String, ProviderError>> + Send {
    async_stream::stream! {
        let mut buffer = String::new();
        let mut stream = Box::pin(byte_stream);

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    buffer.push_str(&String::from_utf8_lossy(&bytes));
                    while let Some(pos) = buffer.find('\n') {
                        let line = buffer[..pos].trim_end_matches('\r').to_string();
                        buffer.drain(..=pos);
                        yield Ok(line);
                    }
                }
                Err(err) => {
                    yield Err(ProviderError::transport(err.to_string(), "stream"));
                    return;
                }
            }
        }

        if !buffer.is_empty() {
            yield Ok(buffer.trim_end_matches('\r').to_string());
        }
    }
}

/// Assemble SSE events from a byte stream.
///
/// Comment lines (starting with `:`) and fields other than `event` and
/// `data` are ignored. An event is dispatched at each blank line that
/// follows at least one data line.
pub fn sse_events(
    byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = Result<SseEvent, ProviderError>> + Send {
    async_stream::stream! {
        let mut current = SseEvent::default();
        let mut has_data = false;
        let mut line_stream = Box::pin(lines(byte_stream));

        while let Some(line) = line_stream.next().await {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };

            if line.is_empty() {
                if has_data {
                    yield Ok(std::mem::take(&mut current));
                    has_data = false;
                }
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            if let Some(value) = line.strip_prefix("event:") {
                current.event = Some(value.trim_start().to_string());
            } else if let Some(value) = line.strip_prefix("data:") {
                if has_data {
                    current.data.push('\n');
                }
                current.data.push_str(value.strip_prefix(' ').unwrap_or(value));
                has_data = true;
            }
        }

        // Some servers close the connection without a final blank line.
        if has_data {
            yield Ok(current);
        }
    }
}

/// Decode newline-delimited JSON.
///
/// Lines that are array framing (`[`, `]`) are skipped and leading
/// commas/brackets are tolerated, so both strict NDJSON and a
/// pretty-printed JSON array of objects decode. Lines that still fail to
/// parse are skipped.
pub fn json_lines(
    byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = Result<Value, ProviderError>> + Send {
    async_stream::stream! {
        let mut line_stream = Box::pin(lines(byte_stream));

        while let Some(line) = line_stream.next().await {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };

            let trimmed = line
                .trim()
                .trim_start_matches(['[', ','])
                .trim_end_matches(']')
                .trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => yield Ok(value),
                Err(err) => {
                    log::debug!("skipping undecodable stream line: {err}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn byte_stream(
        chunks: Vec<&'static str>,
    ) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static {
        stream::iter(chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk))))
    }

    #[tokio::test]
    async fn splits_lines_across_chunk_boundaries() {
        let stream = lines(byte_stream(vec!["hel", "lo\nwor", "ld\n"]));
        let collected: Vec<String> = stream.map(|line| line.unwrap()).collect().await;
        assert_eq!(collected, vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn flushes_trailing_line() {
        let stream = lines(byte_stream(vec!["no newline"]));
        let collected: Vec<String> = stream.map(|line| line.unwrap()).collect().await;
        assert_eq!(collected, vec!["no newline"]);
    }

    #[tokio::test]
    async fn assembles_typed_events() {
        let stream = sse_events(byte_stream(vec![
            "event: message_start\ndata: {\"a\":1}\n\n",
            ": keep-alive\n\ndata: plain\n\n",
        ]));
        let collected: Vec<SseEvent> = stream.map(|event| event.unwrap()).collect().await;
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].event.as_deref(), Some("message_start"));
        assert_eq!(collected[0].data, "{\"a\":1}");
        assert_eq!(collected[1].event, None);
        assert_eq!(collected[1].data, "plain");
    }

    #[tokio::test]
    async fn joins_multiline_data() {
        let stream = sse_events(byte_stream(vec!["data: one\ndata: two\n\n"]));
        let collected: Vec<SseEvent> = stream.map(|event| event.unwrap()).collect().await;
        assert_eq!(collected[0].data, "one\ntwo");
    }

    #[tokio::test]
    async fn decodes_ndjson_and_array_framing() {
        let stream = json_lines(byte_stream(vec![
            "{\"n\":1}\n",
            "[{\"n\":2},\n",
            "{\"n\":3}]\n",
        ]));
        let collected: Vec<Value> = stream.map(|value| value.unwrap()).collect().await;
        let ns: Vec<i64> = collected.iter().map(|v| v["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }
}
