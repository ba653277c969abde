use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the agent system
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM API error: {0}")]
    LlmError(String),

    #[error("Agent call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Orchestration cancelled by caller")]
    Cancelled,

    #[error("Routing output could not be parsed: {0}")]
    ParseError(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// Whether the error came from an untrusted routing decision rather than
    /// from executing a call
    pub fn is_routing_malformed(&self) -> bool {
        matches!(
            self,
            AgentError::ParseError(_) | AgentError::UnknownRole(_)
        )
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
