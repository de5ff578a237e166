//! Error types for askdb.
//!
//! Every pipeline stage reports failures through [`AskError`]; the interactive
//! loop is the only place that turns them into user-visible banners.

use thiserror::Error;

/// Main error type for askdb operations.
#[derive(Error, Debug)]
pub enum AskError {
    /// Database connection errors (bad credentials, host unreachable, unknown database).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Catalog read failures while building the schema description.
    #[error("Introspection error: {0}")]
    Introspection(String),

    /// LLM call failures (transport, auth, rate limits, empty responses).
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// SQL errors reported by the database while running a query.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration errors (invalid config file, unknown provider, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AskError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an introspection error with the given message.
    pub fn introspection(msg: impl Into<String>) -> Self {
        Self::Introspection(msg.into())
    }

    /// Creates a gateway error with the given message.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Introspection(_) => "Introspection Error",
            Self::Gateway(_) => "Gateway Error",
            Self::Execution(_) => "Execution Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(msg)
            | Self::Introspection(msg)
            | Self::Gateway(msg)
            | Self::Execution(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias using AskError.
pub type Result<T> = std::result::Result<T, AskError>;
