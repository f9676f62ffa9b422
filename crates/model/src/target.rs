//! Target and current state records exchanged with controllers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::State;

/// Fully-qualified path of an instance within the entity hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstancePath {
    pub domain: String,
    pub solution: String,
    pub version: String,
    pub element: String,
    pub cluster: String,
    pub instance: String,
}

impl InstancePath {
    /// Create a path from its segments.
    pub fn new(
        domain: impl Into<String>,
        solution: impl Into<String>,
        version: impl Into<String>,
        element: impl Into<String>,
        cluster: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            solution: solution.into(),
            version: version.into(),
            element: element.into(),
            cluster: cluster.into(),
            instance: instance.into(),
        }
    }

    /// The path segments in hierarchy order.
    pub fn segments(&self) -> [&str; 6] {
        [
            &self.domain,
            &self.solution,
            &self.version,
            &self.element,
            &self.cluster,
            &self.instance,
        ]
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.domain, self.solution, self.version, self.element, self.cluster, self.instance
        )
    }
}

/// Desired lifecycle state and configuration of an instance.
///
/// Handed to controllers as the single argument of every lifecycle action;
/// the configuration is an opaque blob owned by the controller's own schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetState {
    pub path: InstancePath,
    pub component: String,
    pub state: State,
    pub configuration: String,
}

/// Last-observed lifecycle state, applied configuration and endpoint of an
/// instance, as reported by a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentState {
    pub path: InstancePath,
    pub component: String,
    pub state: State,
    pub configuration: String,
    pub endpoint: String,
}

impl CurrentState {
    /// Build a current state mirroring a target's identifiers with the given
    /// observed state.
    pub fn mirror(target: &TargetState, state: State) -> Self {
        Self {
            path: target.path.clone(),
            component: target.component.clone(),
            state,
            configuration: target.configuration.clone(),
            endpoint: String::new(),
        }
    }

    /// Attach an endpoint to the record.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Drop configuration and endpoint, keeping identifiers and state.
    pub fn bare(mut self) -> Self {
        self.configuration = String::new();
        self.endpoint = String::new();
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn path() -> InstancePath {
        InstancePath::new("prod", "shop", "v2", "db", "primary", "db-0")
    }

    #[test]
    fn should_join_path_segments_with_slashes() {
        assert_eq!(path().to_string(), "prod/shop/v2/db/primary/db-0");
    }

    #[test]
    fn should_mirror_target_identifiers() {
        let target = TargetState {
            path: path(),
            component: "dummy".into(),
            state: State::Active,
            configuration: "key: value".into(),
        };

        let current = CurrentState::mirror(&target, State::Inactive);
        assert_eq!(current.path, target.path);
        assert_eq!(current.component, "dummy");
        assert_eq!(current.state, State::Inactive);
        assert_eq!(current.configuration, "key: value");
        assert!(current.endpoint.is_empty());
    }

    #[test]
    fn should_strip_configuration_and_endpoint_when_bare() {
        let target = TargetState {
            path: path(),
            component: "dummy".into(),
            state: State::Active,
            configuration: "key: value".into(),
        };

        let current = CurrentState::mirror(&target, State::Undefined)
            .with_endpoint("http://example")
            .bare();
        assert!(current.configuration.is_empty());
        assert!(current.endpoint.is_empty());
    }
}
