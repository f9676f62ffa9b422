//! Maps component types to their controllers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::contract::Controller;
use crate::error::{Error, Result};

/// Immutable lookup table from component type to controller.
///
/// Built once at startup; later registrations for the same component replace
/// the earlier one.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, component: impl Into<String>, controller: Arc<dyn Controller>) {
        self.controllers.insert(component.into(), controller);
    }

    pub fn lookup(&self, component: &str) -> Result<Arc<dyn Controller>> {
        self.controllers
            .get(component)
            .cloned()
            .ok_or_else(|| Error::UnknownComponent {
                component: component.to_owned(),
            })
    }

    /// The component types with a registered controller, sorted.
    pub fn components(&self) -> Vec<String> {
        let mut names: Vec<String> = self.controllers.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::dummy::DummyController;

    #[test]
    fn should_resolve_registered_components() {
        let mut registry = ControllerRegistry::new();
        registry.register("dummy", Arc::new(DummyController::new()));
        assert!(registry.lookup("dummy").is_ok());
        assert_eq!(registry.components(), vec!["dummy".to_owned()]);
    }

    #[test]
    fn should_fail_lookup_for_unknown_components() {
        let registry = ControllerRegistry::new();
        let Err(err) = registry.lookup("postgres") else {
            panic!("lookup of an unregistered component succeeded");
        };
        assert!(matches!(err, Error::UnknownComponent { .. }));
        assert!(err.is_validation());
    }
}
