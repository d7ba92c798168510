//! Error types for paperchat.

use thiserror::Error;

/// Which capability namespace a failed lookup was against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Tool,
    Prompt,
    Resource,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tool => write!(f, "tool"),
            Self::Prompt => write!(f, "prompt"),
            Self::Resource => write!(f, "resource"),
        }
    }
}

/// Primary error type for all paperchat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("{kind} '{key}' not found")]
    Lookup { kind: CapabilityKind, key: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid input: {0}")]
    UserInput(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },
}

impl ChatError {
    /// Create a lookup error for a missing capability.
    pub fn lookup(kind: CapabilityKind, key: impl Into<String>) -> Self {
        Self::Lookup {
            kind,
            key: key.into(),
        }
    }

    /// Whether this error is handled where it is detected (printed, current
    /// action aborted) rather than reported at the shell boundary.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Lookup { .. } | Self::UserInput(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_renders_kind_and_key() {
        let err = ChatError::lookup(CapabilityKind::Resource, "papers://quantum");
        assert_eq!(err.to_string(), "resource 'papers://quantum' not found");
    }

    #[test]
    fn lookup_and_user_input_are_local() {
        assert!(ChatError::lookup(CapabilityKind::Tool, "search").is_local());
        assert!(ChatError::UserInput("missing prompt name".into()).is_local());
        assert!(!ChatError::Connection("refused".into()).is_local());
        assert!(!ChatError::Protocol("bad shape".into()).is_local());
    }
}
