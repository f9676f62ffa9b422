//! In-process controller that pretends every action succeeds.

use async_trait::async_trait;
use stratus_model::{Action, CurrentState, State, TargetState};
use tracing::debug;

use crate::contract::Controller;
use crate::error::Result;

/// Controller with no backing system.
///
/// Each action reports the stable state that action reaches on success, so a
/// create aimed at an active target still lands in `Inactive` and the next
/// reconciliation round issues the start. Useful for demos and for tests of
/// everything above the controller boundary.
#[derive(Debug, Default)]
pub struct DummyController;

impl DummyController {
    pub fn new() -> Self {
        Self
    }

    fn endpoint_for(target: &TargetState, state: State) -> String {
        if state == State::Active {
            format!("dummy://{}", target.path)
        } else {
            String::new()
        }
    }

    fn reach(target: &TargetState, action: Action, from: State) -> CurrentState {
        let state = action.success_state(from);
        let endpoint = Self::endpoint_for(target, state);
        debug!(path = %target.path, ?action, ?state, "dummy action");
        CurrentState::mirror(target, state).with_endpoint(endpoint)
    }
}

#[async_trait]
impl Controller for DummyController {
    async fn status(&self, target: &TargetState) -> Result<CurrentState> {
        // stateless: report the desired state as reached
        let endpoint = Self::endpoint_for(target, target.state);
        Ok(CurrentState::mirror(target, target.state).with_endpoint(endpoint))
    }

    async fn create(&self, target: &TargetState) -> Result<CurrentState> {
        Ok(Self::reach(target, Action::Create, State::Initial))
    }

    async fn start(&self, target: &TargetState) -> Result<CurrentState> {
        Ok(Self::reach(target, Action::Start, State::Inactive))
    }

    async fn stop(&self, target: &TargetState) -> Result<CurrentState> {
        Ok(Self::reach(target, Action::Stop, State::Active))
    }

    async fn configure(&self, target: &TargetState) -> Result<CurrentState> {
        Ok(Self::reach(target, Action::Configure, State::Inactive))
    }

    async fn reconfigure(&self, target: &TargetState) -> Result<CurrentState> {
        Ok(Self::reach(target, Action::Reconfigure, State::Active))
    }

    async fn reset(&self, target: &TargetState) -> Result<CurrentState> {
        Ok(Self::reach(target, Action::Reset, State::Failure))
    }

    async fn destroy(&self, target: &TargetState) -> Result<CurrentState> {
        Ok(Self::reach(target, Action::Destroy, State::Inactive))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use stratus_model::InstancePath;

    use super::*;

    fn target(state: State) -> TargetState {
        TargetState {
            path: InstancePath::new("prod", "shop", "v1", "web", "frontends", "web-0"),
            component: "dummy".into(),
            state,
            configuration: "port: 8080".into(),
        }
    }

    #[tokio::test]
    async fn should_land_create_in_inactive_even_for_active_targets() {
        let controller = DummyController::new();
        let current = controller.create(&target(State::Active)).await.unwrap();
        assert_eq!(current.state, State::Inactive);
        assert!(current.endpoint.is_empty());
    }

    #[tokio::test]
    async fn should_expose_an_endpoint_once_started() {
        let controller = DummyController::new();
        let current = controller.start(&target(State::Active)).await.unwrap();
        assert_eq!(current.state, State::Active);
        assert_eq!(current.endpoint, "dummy://prod/shop/v1/web/frontends/web-0");
    }

    #[tokio::test]
    async fn should_answer_status_idempotently() {
        let controller = DummyController::new();
        let first = controller.status(&target(State::Active)).await.unwrap();
        let second = controller.status(&target(State::Active)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.configuration, "port: 8080");
    }
}
