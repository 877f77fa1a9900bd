//! Stdio transport: a subprocess speaking newline-delimited JSON.

use crate::mcp::transport::{McpError, McpTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Configuration for a stdio MCP server.
#[derive(Debug, Clone)]
pub struct StdioConfig {
    /// Executable to spawn.
    pub command: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Extra environment variables.
    pub env: HashMap<String, String>,
    /// Working directory.
    pub cwd: Option<String>,
}

impl StdioConfig {
    /// Configuration for a bare command with no arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Set the arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Transport that spawns a subprocess and exchanges newline-delimited JSON
/// over its stdin/stdout. The server's stderr is inherited so diagnostics
/// stay visible.
pub struct StdioTransport {
    config: StdioConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    reader: Option<JoinHandle<()>>,
}

impl StdioTransport {
    /// Create a transport for the given configuration. Nothing is spawned
    /// until `start`.
    pub fn new(config: StdioConfig) -> Self {
        Self {
            config,
            child: None,
            stdin: None,
            reader: None,
        }
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn start(&mut self) -> Result<mpsc::Receiver<Value>, McpError> {
        if self.child.is_some() {
            return Err(McpError::transport("stdio transport already started"));
        }

        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(cwd) = &self.config.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|err| {
            McpError::transport(format!(
                "failed to spawn '{}': {err}",
                self.config.command
            ))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::transport("child stdout unavailable"))?;
        self.stdin = child.stdin.take();
        self.child = Some(child);

        let (tx, rx) = mpsc::channel(64);
        self.reader = Some(tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Value>(&line) {
                    Ok(message) => {
                        if tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => log::debug!("skipping undecodable MCP line: {err}"),
                }
            }
        }));

        Ok(rx)
    }

    async fn send(&mut self, message: Value) -> Result<(), McpError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| McpError::transport("stdio transport not started"))?;
        let mut line = serde_json::to_vec(&message)
            .map_err(|err| McpError::transport(err.to_string()))?;
        line.push(b'\n');
        stdin
            .write_all(&line)
            .await
            .map_err(|err| McpError::transport(format!("write to server failed: {err}")))?;
        stdin
            .flush()
            .await
            .map_err(|err| McpError::transport(format!("flush to server failed: {err}")))
    }

    async fn close(&mut self) -> Result<(), McpError> {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
        }
        Ok(())
    }
}
