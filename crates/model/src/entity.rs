//! Entity hierarchy: domain, solution, element, cluster, instance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::State;

/// Top-level namespace owning solutions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub solutions: HashMap<String, Solution>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solutions: HashMap::new(),
        }
    }
}

/// Named, multi-versioned application definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    pub name: String,
    pub versions: HashMap<String, SolutionVersion>,
}

impl Solution {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: HashMap::new(),
        }
    }
}

/// One version of a solution, owning its deployable elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionVersion {
    pub version: String,
    pub elements: HashMap<String, Element>,
}

impl SolutionVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            elements: HashMap::new(),
        }
    }
}

/// A deployable unit type; its component selects the controller for all of
/// its instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub component: String,
    pub clusters: HashMap<String, Cluster>,
}

impl Element {
    pub fn new(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
            clusters: HashMap::new(),
        }
    }
}

/// A homogeneous group of instances fulfilling one element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub instances: HashMap<String, Instance>,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: HashMap::new(),
        }
    }
}

/// Atomic unit of lifecycle.
///
/// `target_state`/`target_configuration` are mutated only through the
/// external API; the observed fields are mutated only by the dispatcher after
/// a controller call. `latched` marks an instance that failed and must not be
/// reconciled again until an operator intervenes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub component: String,
    pub target_state: State,
    pub target_configuration: String,
    pub state: State,
    pub configuration: String,
    pub endpoint: String,
    pub last_error: Option<String>,
    pub latched: bool,
}

impl Instance {
    pub fn new(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
            target_state: State::Initial,
            target_configuration: String::new(),
            state: State::Initial,
            configuration: String::new(),
            endpoint: String::new(),
            last_error: None,
            latched: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_instances_in_the_initial_state() {
        let instance = Instance::new("web-0", "dummy");
        assert_eq!(instance.state, State::Initial);
        assert_eq!(instance.target_state, State::Initial);
        assert!(instance.endpoint.is_empty());
        assert!(!instance.latched);
    }
}
