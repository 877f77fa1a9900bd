//! SSE transport: an event stream down, POSTed requests up.
//!
//! The client opens an SSE connection; the server's first `endpoint` event
//! advertises the URL subsequent requests are POSTed to, and responses
//! arrive as `message` events on the stream.

use crate::mcp::transport::{McpError, McpTransport};
use async_trait::async_trait;
use futures_util::StreamExt;
use inferkit_provider::shared::Headers;
use inferkit_provider_utils::sse::sse_events;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use url::Url;

const ENDPOINT_WAIT: Duration = Duration::from_secs(10);

/// Transport over Server-Sent Events.
pub struct SseTransport {
    url: String,
    headers: Headers,
    client: reqwest::Client,
    endpoint: watch::Receiver<Option<String>>,
    endpoint_tx: Option<watch::Sender<Option<String>>>,
    reader: Option<JoinHandle<()>>,
}

impl SseTransport {
    /// Create a transport for the given SSE URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_headers(url, Headers::new())
    }

    /// Create a transport with extra headers (e.g. authorization).
    pub fn with_headers(url: impl Into<String>, headers: Headers) -> Self {
        let (endpoint_tx, endpoint) = watch::channel(None);
        Self {
            url: url.into(),
            headers,
            client: reqwest::Client::new(),
            endpoint,
            endpoint_tx: Some(endpoint_tx),
            reader: None,
        }
    }

    async fn wait_for_endpoint(&mut self) -> Result<String, McpError> {
        if let Some(endpoint) = self.endpoint.borrow().clone() {
            return Ok(endpoint);
        }
        let changed = tokio::time::timeout(ENDPOINT_WAIT, self.endpoint.changed()).await;
        match changed {
            Ok(Ok(())) => self
                .endpoint
                .borrow()
                .clone()
                .ok_or_else(|| McpError::protocol("endpoint event carried no URL")),
            Ok(Err(_)) => Err(McpError::Closed),
            Err(_) => Err(McpError::protocol(
                "server did not advertise an endpoint in time",
            )),
        }
    }
}

#[async_trait]
impl McpTransport for SseTransport {
    async fn start(&mut self) -> Result<mpsc::Receiver<Value>, McpError> {
        let endpoint_tx = self
            .endpoint_tx
            .take()
            .ok_or_else(|| McpError::transport("SSE transport already started"))?;

        let mut request = self
            .client
            .get(&self.url)
            .header("accept", "text/event-stream");
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| McpError::transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(McpError::transport(format!(
                "SSE connection failed with status {}",
                response.status()
            )));
        }

        let base_url = self.url.clone();
        let (tx, rx) = mpsc::channel(64);
        self.reader = Some(tokio::spawn(async move {
            let mut events = Box::pin(sse_events(response.bytes_stream()));
            while let Some(event) = events.next().await {
                let Ok(event) = event else { break };
                match event.event.as_deref() {
                    Some("endpoint") => {
                        // The endpoint may be relative to the SSE URL.
                        let resolved = Url::parse(&base_url)
                            .ok()
                            .and_then(|base| base.join(event.data.trim()).ok())
                            .map(|url| url.to_string())
                            .unwrap_or_else(|| event.data.trim().to_string());
                        let _ = endpoint_tx.send(Some(resolved));
                    }
                    Some("message") | None => {
                        match serde_json::from_str::<Value>(&event.data) {
                            Ok(message) => {
                                if tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                log::debug!("skipping undecodable MCP SSE message: {err}")
                            }
                        }
                    }
                    Some(_) => {}
                }
            }
        }));

        Ok(rx)
    }

    async fn send(&mut self, message: Value) -> Result<(), McpError> {
        let endpoint = self.wait_for_endpoint().await?;

        let mut request = self.client.post(&endpoint).json(&message);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| McpError::transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(McpError::transport(format!(
                "POST to MCP endpoint failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), McpError> {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        Ok(())
    }
}
