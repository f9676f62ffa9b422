//! Protocol error types.

use thiserror::Error;

/// Errors arising on the wire between orchestrator and controller.
#[derive(Debug, Error)]
pub enum Error {
    /// A request or response could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_yaml::Error),

    /// A request or response could not be parsed.
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_yaml::Error),

    /// The transport carrying the message failed.
    #[error("transport failed: {0}")]
    Transport(String),

    /// No response arrived within the deadline.
    #[error("no response within {ms}ms")]
    DeadlineExpired { ms: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
