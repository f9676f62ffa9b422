//! Error types for the model crate.

use thiserror::Error;

use crate::state::State;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Model error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Domain not found.
    #[error("unknown domain '{name}'")]
    UnknownDomain { name: String },

    /// Solution not found within a domain.
    #[error("unknown solution '{name}'")]
    UnknownSolution { name: String },

    /// Solution version not found.
    #[error("unknown version '{version}' of solution '{solution}'")]
    UnknownVersion { solution: String, version: String },

    /// Element not found within a solution version.
    #[error("unknown element '{name}'")]
    UnknownElement { name: String },

    /// Cluster not found within an element.
    #[error("unknown cluster '{name}'")]
    UnknownCluster { name: String },

    /// Instance not found within a cluster.
    #[error("unknown instance '{name}'")]
    UnknownInstance { name: String },

    /// Entity already exists.
    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },

    /// The requested target state cannot be asked for.
    #[error("'{state}' is not a valid target state")]
    InvalidTarget { state: State },

    /// A string does not name a known lifecycle state.
    #[error("'{value}' is not a lifecycle state")]
    UnknownState { value: String },

    /// The state is not a transient state.
    #[error("'{state}' is not a transient state")]
    InvalidTransient { state: State },

    /// No transition exists between the two states.
    #[error("no transition from '{from}' to '{to}'")]
    NoTransition { from: State, to: State },

    /// An instance may only be removed once it reached the undefined state.
    #[error("instance '{name}' has not been destroyed")]
    NotDestroyed { name: String },
}

impl Error {
    /// Create a duplicate entity error.
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn should_render_unknown_path_segment() {
        let err = Error::UnknownCluster {
            name: "servers".into(),
        };
        assert_eq!(err.to_string(), "unknown cluster 'servers'");
    }

    #[test]
    fn should_render_transition_error_with_states() {
        let err = Error::NoTransition {
            from: State::Creating,
            to: State::Active,
        };
        assert!(err.to_string().contains("creating"));
        assert!(err.to_string().contains("active"));
    }
}
