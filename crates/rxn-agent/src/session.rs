use crate::error::AgentError;
use rxn_common::mcp::{
    JsonRpcRequest, JsonRpcResponse, ToolCallResult, ToolDefinition, ToolsListResult,
    PROTOCOL_VERSION,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// Where the agent sends tool calls.
#[async_trait::async_trait]
pub trait ToolCaller: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, AgentError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult, AgentError>;
}

struct Pipe {
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

/// MCP client over the stdio pipes of a spawned server process.
///
/// Requests are serialized: one in flight at a time. The child is killed
/// when the session is dropped.
pub struct McpSession {
    child: Mutex<Child>,
    pipe: Mutex<Pipe>,
}

impl McpSession {
    /// Spawn `program args...` and run the MCP initialize handshake.
    pub async fn spawn(program: &str, args: &[String]) -> Result<Self, AgentError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AgentError::Spawn {
                command: program.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AgentError::Protocol("child stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Protocol("child stdout not captured".into()))?;

        let session = Self {
            child: Mutex::new(child),
            pipe: Mutex::new(Pipe {
                stdin,
                lines: BufReader::new(stdout).lines(),
                next_id: 1,
            }),
        };
        session.initialize().await?;
        Ok(session)
    }

    async fn initialize(&self) -> Result<(), AgentError> {
        let result: Value = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "rxn-agent",
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                }),
            )
            .await?;
        tracing::info!(
            "Connected to MCP server {}",
            result["serverInfo"]["name"].as_str().unwrap_or("<unnamed>")
        );
        self.notify("notifications/initialized").await
    }

    async fn notify(&self, method: &str) -> Result<(), AgentError> {
        let mut pipe = self.pipe.lock().await;
        write_line(&mut pipe.stdin, &JsonRpcRequest::notification(method)).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, AgentError> {
        let mut pipe = self.pipe.lock().await;
        let id = pipe.next_id;
        pipe.next_id += 1;

        write_line(&mut pipe.stdin, &JsonRpcRequest::call(id, method, params)).await?;

        loop {
            let Some(line) = pipe.lines.next_line().await? else {
                return Err(AgentError::Disconnected);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response: JsonRpcResponse = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("Skipping non-response line from server ({e}): {line}");
                    continue;
                }
            };
            // Server notifications and stale replies carry no or another id.
            if response.id.as_ref().and_then(Value::as_u64) != Some(id) {
                continue;
            }

            if let Some(error) = response.error {
                return Err(AgentError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            let result = response
                .result
                .ok_or_else(|| AgentError::Protocol(format!("'{method}' reply has no result")))?;
            return serde_json::from_value(result)
                .map_err(|e| AgentError::Protocol(format!("'{method}' result: {e}")));
        }
    }

    pub async fn close(&self) -> Result<(), AgentError> {
        let mut child = self.child.lock().await;
        if child.try_wait()?.is_none() {
            child.kill().await?;
        }
        tracing::info!("MCP session closed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ToolCaller for McpSession {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, AgentError> {
        let result: ToolsListResult = self.request("tools/list", json!({})).await?;
        Ok(result.tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult, AgentError> {
        tracing::info!("Calling MCP tool {} with {}", name, arguments);
        let result: ToolCallResult = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        tracing::info!(
            "Tool {} returned {} chars (error: {})",
            name,
            result.joined_text().len(),
            result.is_error
        );
        Ok(result)
    }
}

async fn write_line(stdin: &mut ChildStdin, request: &JsonRpcRequest) -> Result<(), AgentError> {
    let json = serde_json::to_string(request)
        .map_err(|e| AgentError::Protocol(format!("cannot encode request: {e}")))?;
    stdin.write_all(json.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}
