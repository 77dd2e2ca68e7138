//! Custom error types for flowcheck
//!
//! One taxonomy for the whole harness so a failure's kind is always
//! inspectable: configuration problems abort a run before any browser
//! launches, per-step problems are captured into step results.

use thiserror::Error;

/// Main error type for flowcheck operations
#[derive(Error, Debug)]
pub enum FlowcheckError {
    /// Invalid run configuration (bad base location, empty step list).
    /// The only variant allowed to escape a run to the caller.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A browser action could not be completed (element missing,
    /// navigation failed, click blocked)
    #[error("Action error: {0}")]
    Action(String),

    /// A wait condition was not satisfied within its timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Observed page state diverged from the expected state
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// A screenshot or artifact write failed; always downgraded to a
    /// logged warning, never changes a step's status
    #[error("Capture error: {0}")]
    Capture(String),

    /// Agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for flowcheck operations
pub type Result<T> = std::result::Result<T, FlowcheckError>;

impl FlowcheckError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an action error
    pub fn action(msg: impl Into<String>) -> Self {
        Self::Action(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an assertion failure
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }

    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Whether this error maps to a FAIL step status rather than ERROR
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }
}
