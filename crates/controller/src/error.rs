//! Controller error types.

use thiserror::Error;

/// Failure of a controller action.
///
/// The variants separate faults the orchestrator can attribute to the caller
/// from faults of the controller or its backing system, mirroring the
/// response codes used on the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// No controller is registered for the requested component type.
    #[error("no controller registered for component '{component}'")]
    UnknownComponent { component: String },

    /// The request or its configuration was invalid.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The backing system failed while executing the action.
    #[error("backend failed: {0}")]
    Backend(String),

    /// The controller could not be reached.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The action did not complete within the deadline.
    #[error("action timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// The response code this failure maps to on the wire.
    pub fn code(&self) -> u16 {
        match self {
            Self::UnknownComponent { .. } | Self::Validation(_) => 400,
            Self::Backend(_) => 500,
            Self::Transport(_) => 502,
            Self::Timeout { .. } => 504,
        }
    }

    /// Whether the fault lies with the request rather than the backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnknownComponent { .. } | Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn should_map_failures_to_wire_codes() {
        assert_eq!(Error::validation("bad config").code(), 400);
        assert_eq!(Error::backend("boom").code(), 500);
        assert_eq!(Error::transport("refused").code(), 502);
        assert_eq!(Error::Timeout { timeout_ms: 10_000 }.code(), 504);
    }
}
