//! Error types for the decision engine and its store collaborators.

use std::time::Duration;

/// Errors talking to the backing token store.
///
/// None of the variants carry the token being looked up; messages are safe
/// to log as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Connection, TLS, or other transport failure.
    #[error("store transport error: {message}")]
    Transport { message: String },

    /// The lookup did not complete in time.
    #[error("store lookup timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The store answered with an error status.
    #[error("store returned {status}: {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The store answered, but the payload could not be understood.
    #[error("invalid store response: {message}")]
    InvalidResponse { message: String },

    /// The store client is misconfigured.
    #[error("store configuration error: {message}")]
    Config { message: String },
}

impl StoreError {
    /// Whether a transport layer may retry the failed call.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Service { status, code, .. } => {
                *status >= 500
                    || code == "ThrottlingException"
                    || code == "ProvisionedThroughputExceededException"
                    || code == "RequestLimitExceeded"
            }
            Self::InvalidResponse { .. } | Self::Config { .. } => false,
        }
    }

    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Service { .. } => "service",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::Config { .. } => "config",
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The caller handed the policy builder something it cannot turn into a decision.
///
/// This is a bug in the calling collaborator, never an authorization outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPolicyInput {
    #[error("unsupported effect '{value}' (expected Allow or Deny)")]
    UnsupportedEffect { value: String },

    #[error("resource identifier must not be empty")]
    EmptyResource,
}

/// Configuration could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse authorizer config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
