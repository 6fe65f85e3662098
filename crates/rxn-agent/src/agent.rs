use crate::chat::{ChatMessage, ChatModel, ToolCall};
use crate::error::AgentError;
use crate::prompts::SYSTEM_PROMPT;
use crate::session::ToolCaller;
use rxn_common::mcp::ToolDefinition;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub system_prompt: String,
    /// Model turns allowed per query before giving up.
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.into(),
            max_iterations: 5,
        }
    }
}

/// Tool-calling loop: the model proposes calls, the tool server runs them,
/// and results are fed back until the model answers in plain text.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    caller: Arc<dyn ToolCaller>,
    tools: Vec<ToolDefinition>,
    config: AgentConfig,
}

impl Agent {
    /// Fetch the tool list once; every query advertises the same tools.
    pub async fn initialize(
        model: Arc<dyn ChatModel>,
        caller: Arc<dyn ToolCaller>,
        config: AgentConfig,
    ) -> Result<Self, AgentError> {
        let tools = caller.list_tools().await?;
        tracing::info!(
            "Agent ready with {} tools: {}",
            tools.len(),
            tools
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self {
            model,
            caller,
            tools,
            config,
        })
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub async fn run(&self, query: &str) -> Result<String, AgentError> {
        let mut messages = vec![
            ChatMessage::system(&self.config.system_prompt),
            ChatMessage::user(query),
        ];

        for iteration in 1..=self.config.max_iterations {
            let reply = self.model.complete(&messages, &self.tools).await?;

            if reply.tool_calls.is_empty() {
                tracing::info!("Final answer after {} iteration(s)", iteration);
                return Ok(reply.content.unwrap_or_default());
            }

            tracing::debug!(
                "Iteration {}: model requested {} tool call(s)",
                iteration,
                reply.tool_calls.len()
            );
            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                let text = self.dispatch(call).await?;
                messages.push(ChatMessage::tool_result(&call.id, text));
            }
        }

        tracing::warn!(
            "No final answer within {} iterations",
            self.config.max_iterations
        );
        Err(AgentError::IterationLimit(self.config.max_iterations))
    }

    /// Run one tool call and render its outcome as the tool message text.
    /// Bad arguments and tool-reported errors go back to the model; transport
    /// failures abort the query.
    async fn dispatch(&self, call: &ToolCall) -> Result<String, AgentError> {
        let raw = call.function.arguments.trim();
        let arguments: Value = if raw.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(raw) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("Model sent malformed arguments for {}: {e}", call.function.name);
                    return Ok(format!("Tool error: invalid JSON arguments: {e}"));
                }
            }
        };

        match self.caller.call_tool(&call.function.name, arguments).await {
            Ok(result) if result.is_error => Ok(format!("Tool error: {}", result.joined_text())),
            Ok(result) => Ok(result.joined_text()),
            Err(AgentError::Rpc { message, .. }) => Ok(format!("Tool error: {message}")),
            Err(e) => Err(e),
        }
    }
}
