pub mod agent;
pub mod chat;
pub mod error;
pub mod prompts;
pub mod session;

pub use agent::{Agent, AgentConfig};
pub use chat::{ChatConfig, ChatMessage, ChatModel, OpenAiCompatibleClient};
pub use error::AgentError;
pub use session::{McpSession, ToolCaller};
