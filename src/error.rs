//! Error types for the to-do agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for the to-do agent
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed decision: {0}")]
    MalformedDecision(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Whether the error came from an external backend (model API or database)
    pub fn is_backend_fault(&self) -> bool {
        matches!(
            self,
            AgentError::Database(_) | AgentError::Http(_) | AgentError::Model(_) | AgentError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_fault_classification() {
        assert!(AgentError::Model("503".to_string()).is_backend_fault());
        assert!(!AgentError::UnknownTool("dropTable".to_string()).is_backend_fault());
        assert!(!AgentError::MalformedDecision("eof".to_string()).is_backend_fault());
    }

    #[test]
    fn test_unknown_tool_message() {
        let err = AgentError::UnknownTool("dropTable".to_string());
        assert_eq!(err.to_string(), "Unknown tool: dropTable");
    }
}
