//! The MCP client.

use crate::mcp::json_rpc::{
    JsonRpcNotification, JsonRpcRequest, parse_response,
};
use crate::mcp::transport::{McpError, McpTransport};
use crate::mcp::types::{
    CallToolResult, Implementation, InitializeResult, LATEST_PROTOCOL_VERSION, ListToolsResult,
    McpToolDefinition, SUPPORTED_PROTOCOL_VERSIONS, ServerCapabilities,
};
use inferkit_provider::language_model::tool::Tool;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type PendingMap = Arc<std::sync::Mutex<HashMap<i64, oneshot::Sender<Value>>>>;

/// A connected MCP client.
///
/// Request/response correlation uses monotonically increasing integer ids;
/// every request is bounded by a 30 second timeout. The client is `Send +
/// Sync` and can be shared behind an `Arc`.
pub struct McpClient {
    transport: Mutex<Box<dyn McpTransport>>,
    pending: PendingMap,
    next_id: AtomicI64,
    closed: AtomicBool,
    dispatcher: JoinHandle<()>,
    server_capabilities: ServerCapabilities,
    server_info: Implementation,
}

/// A tool discovered from an MCP server, bound to its client for
/// execution.
#[derive(Clone)]
pub struct McpTool {
    /// The server's tool definition.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// JSON Schema of the tool's arguments.
    pub input_schema: Value,
    client: Arc<McpClient>,
}

impl McpTool {
    /// Render as a function tool for a language model request.
    pub fn to_function_tool(&self) -> Tool {
        Tool::function(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        )
    }

    /// Invoke the tool with the given arguments, resolving the result's
    /// content to text.
    pub async fn execute(&self, arguments: Value) -> Result<String, McpError> {
        self.client.call_tool(&self.name, arguments).await
    }
}

impl McpClient {
    /// Start a transport, perform the initialize handshake and return the
    /// connected client.
    pub async fn connect(
        mut transport: Box<dyn McpTransport>,
        client_name: &str,
    ) -> Result<Arc<Self>, McpError> {
        let mut incoming = transport.start().await?;

        let pending: PendingMap = Arc::new(std::sync::Mutex::new(HashMap::new()));
        let dispatcher_pending = Arc::clone(&pending);
        let dispatcher = tokio::spawn(async move {
            while let Some(message) = incoming.recv().await {
                if let Some(response) = parse_response(&message) {
                    let sender = dispatcher_pending.lock().unwrap().remove(&response.id);
                    if let Some(sender) = sender {
                        let _ = sender.send(message);
                    }
                }
                // Server-initiated requests and notifications are ignored;
                // this client only converts tools.
            }
        });

        let client = Self {
            transport: Mutex::new(transport),
            pending,
            next_id: AtomicI64::new(1),
            closed: AtomicBool::new(false),
            dispatcher,
            server_capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: String::new(),
                version: String::new(),
            },
        };

        let init_result = client
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": LATEST_PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": client_name,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                })),
            )
            .await?;

        let initialized: InitializeResult = serde_json::from_value(init_result)
            .map_err(|err| McpError::protocol(format!("invalid initialize result: {err}")))?;

        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&initialized.protocol_version.as_str()) {
            let mut client = client;
            let _ = client.shutdown().await;
            return Err(McpError::protocol(format!(
                "unsupported protocol version '{}'",
                initialized.protocol_version
            )));
        }

        let mut client = client;
        client.server_capabilities = initialized.capabilities;
        client.server_info = initialized.server_info;

        client
            .notify("notifications/initialized", None)
            .await?;

        Ok(Arc::new(client))
    }

    /// Info the server reported about itself.
    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Capabilities the server advertised.
    pub fn server_capabilities(&self) -> &ServerCapabilities {
        &self.server_capabilities
    }

    /// List the server's tools, bound to this client for execution.
    pub async fn tools(self: &Arc<Self>) -> Result<Vec<McpTool>, McpError> {
        let result = self.request("tools/list", None).await?;
        let listed: ListToolsResult = serde_json::from_value(result)
            .map_err(|err| McpError::protocol(format!("invalid tools/list result: {err}")))?;

        Ok(listed
            .tools
            .into_iter()
            .map(|definition: McpToolDefinition| McpTool {
                name: definition.name,
                description: definition.description,
                input_schema: definition.input_schema,
                client: Arc::clone(self),
            })
            .collect())
    }

    /// Call a tool by name and resolve the result content to text.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, McpError> {
        let result = self
            .request(
                "tools/call",
                Some(json!({"name": name, "arguments": arguments})),
            )
            .await?;

        let call_result: CallToolResult = serde_json::from_value(result)
            .map_err(|err| McpError::protocol(format!("invalid tools/call result: {err}")))?;

        let text = call_result.to_text();
        if call_result.is_error {
            return Err(McpError::Tool {
                tool: name.to_string(),
                message: text,
            });
        }
        Ok(text)
    }

    /// Close the connection and tear down the transport.
    pub async fn close(&self) -> Result<(), McpError> {
        self.closed.store(true, Ordering::SeqCst);
        self.dispatcher.abort();
        self.pending.lock().unwrap().clear();
        self.transport.lock().await.close().await
    }

    async fn shutdown(&mut self) -> Result<(), McpError> {
        self.closed.store(true, Ordering::SeqCst);
        self.dispatcher.abort();
        self.transport.get_mut().close().await
    }

    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(McpError::Closed);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);

        let request = JsonRpcRequest::new(id, method, params);
        let message =
            serde_json::to_value(&request).map_err(|err| McpError::transport(err.to_string()))?;
        if let Err(err) = self.transport.lock().await.send(message).await {
            self.pending.lock().unwrap().remove(&id);
            return Err(err);
        }

        let response = match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(McpError::Closed),
            Err(_) => {
                self.pending.lock().unwrap().remove(&id);
                return Err(McpError::Timeout {
                    method: method.to_string(),
                });
            }
        };

        let parsed = parse_response(&response)
            .ok_or_else(|| McpError::protocol("dispatcher delivered a non-response"))?;
        if let Some(error) = parsed.error {
            return Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        parsed
            .result
            .ok_or_else(|| McpError::protocol("response carried neither result nor error"))
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        let notification = JsonRpcNotification::new(method, params);
        let message = serde_json::to_value(&notification)
            .map_err(|err| McpError::transport(err.to_string()))?;
        self.transport.lock().await.send(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// An in-memory MCP server advertising one `add` tool.
    struct FakeServerTransport {
        to_client: Option<mpsc::Sender<Value>>,
    }

    impl FakeServerTransport {
        fn new() -> Self {
            Self { to_client: None }
        }

        fn respond(&self, request: &Value) -> Option<Value> {
            let id = request.get("id")?.as_i64()?;
            let method = request.get("method")?.as_str()?;
            let result = match method {
                "initialize" => json!({
                    "protocolVersion": "2025-06-18",
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": "fake-server", "version": "0.0.1"},
                }),
                "tools/list" => json!({
                    "tools": [{
                        "name": "add",
                        "description": "Add two numbers",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "a": {"type": "number"},
                                "b": {"type": "number"}
                            },
                            "required": ["a", "b"]
                        }
                    }]
                }),
                "tools/call" => {
                    let args = &request["params"]["arguments"];
                    let sum = args["a"].as_f64().unwrap() + args["b"].as_f64().unwrap();
                    json!({"content": [{"type": "text", "text": sum.to_string()}]})
                }
                _ => return None,
            };
            Some(json!({"jsonrpc": "2.0", "id": id, "result": result}))
        }
    }

    #[async_trait]
    impl McpTransport for FakeServerTransport {
        async fn start(&mut self) -> Result<mpsc::Receiver<Value>, McpError> {
            let (tx, rx) = mpsc::channel(16);
            self.to_client = Some(tx);
            Ok(rx)
        }

        async fn send(&mut self, message: Value) -> Result<(), McpError> {
            // Notifications get no response.
            if message.get("id").is_none() {
                return Ok(());
            }
            if let Some(response) = self.respond(&message) {
                self.to_client
                    .as_ref()
                    .unwrap()
                    .send(response)
                    .await
                    .map_err(|_| McpError::Closed)?;
            }
            Ok(())
        }

        async fn close(&mut self) -> Result<(), McpError> {
            self.to_client = None;
            Ok(())
        }
    }

    #[tokio::test]
    async fn discovers_and_executes_tools() {
        let client = McpClient::connect(Box::new(FakeServerTransport::new()), "test-client")
            .await
            .unwrap();
        assert_eq!(client.server_info().name, "fake-server");

        let tools = client.tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "add");
        assert_eq!(
            tools[0].input_schema["properties"]["a"]["type"],
            "number"
        );

        // The discovered tool converts to a function tool...
        let function = tools[0].to_function_tool();
        assert_eq!(function.name(), "add");

        // ...and its executor routes through tools/call.
        let result = tools[0].execute(json!({"a": 2, "b": 3})).await.unwrap();
        assert_eq!(result, "5");

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn requests_after_close_fail() {
        let client = McpClient::connect(Box::new(FakeServerTransport::new()), "test-client")
            .await
            .unwrap();
        client.close().await.unwrap();
        assert!(matches!(client.tools().await, Err(McpError::Closed)));
    }
}
