use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to start MCP server '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("MCP server I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("MCP server closed the connection")]
    Disconnected,

    #[error("MCP error {code}: {message}")]
    Rpc { code: i32, message: String },

    #[error("Invalid MCP message: {0}")]
    Protocol(String),

    #[error("Chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model provider error: {0}")]
    Provider(String),

    #[error("No final answer after {0} iterations")]
    IterationLimit(usize),
}
