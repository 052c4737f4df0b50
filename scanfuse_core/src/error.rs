//! Error types for scanfuse
//!
//! The mapping core never fails; these errors only come out of the plumbing
//! around it (configuration loading, topic creation, record parsing, node
//! lifecycle).

use thiserror::Error;

/// Result alias used across scanfuse crates
pub type ScanfuseResult<T> = Result<T, ScanfuseError>;

/// Main error type for scanfuse operations
#[derive(Debug, Error)]
pub enum ScanfuseError {
    /// Filesystem or stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record or config document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topic creation or message delivery failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Failure reported by a specific node
    #[error("Node '{node}' error: {message}")]
    Node { node: String, message: String },

    /// Caller supplied an argument outside the accepted domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected runtime condition
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanfuseError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ScanfuseError::Config(message.into())
    }

    /// Shorthand for an error attributed to a node
    pub fn node(node: impl Into<String>, message: impl Into<String>) -> Self {
        ScanfuseError::Node {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a communication error
    pub fn communication(message: impl Into<String>) -> Self {
        ScanfuseError::Communication(message.into())
    }
}

impl From<serde_json::Error> for ScanfuseError {
    fn from(err: serde_json::Error) -> Self {
        ScanfuseError::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for ScanfuseError {
    fn from(err: serde_yaml::Error) -> Self {
        ScanfuseError::Serialization(format!("YAML: {}", err))
    }
}

impl From<toml::de::Error> for ScanfuseError {
    fn from(err: toml::de::Error) -> Self {
        ScanfuseError::Serialization(format!("TOML: {}", err))
    }
}

impl From<toml::ser::Error> for ScanfuseError {
    fn from(err: toml::ser::Error) -> Self {
        ScanfuseError::Serialization(format!("TOML: {}", err))
    }
}
