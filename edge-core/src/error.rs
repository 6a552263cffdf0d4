//! Error types for the agent

use thiserror::Error;

/// Agent-wide error type
#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EdgeError {
    pub fn api(msg: impl Into<String>) -> Self {
        EdgeError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        EdgeError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        EdgeError::Parse(msg.into())
    }

    pub fn classifier(msg: impl Into<String>) -> Self {
        EdgeError::Classifier(msg.into())
    }

    pub fn ledger(msg: impl Into<String>) -> Self {
        EdgeError::Ledger(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        EdgeError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        EdgeError::Internal(msg.into())
    }
}

/// Result type alias for agent operations
pub type EdgeResult<T> = Result<T, EdgeError>;
