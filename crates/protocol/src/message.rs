//! Request and response envelopes exchanged with controllers.
//!
//! The wire format is YAML with PascalCase keys. Every request carries the
//! full instance path so a stateless controller can act without any local
//! bookkeeping; every response echoes the request id for correlation.

use serde::{Deserialize, Serialize};
use stratus_model::{Action, CurrentState, InstancePath, State, TargetState};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Well-known response codes.
pub mod code {
    /// The action succeeded.
    pub const OK: u16 = 200;
    /// The request was malformed or its configuration invalid.
    pub const BAD_REQUEST: u16 = 400;
    /// The addressed instance is unknown to the controller.
    pub const NOT_FOUND: u16 = 404;
    /// The backing system failed while executing the action.
    pub const INTERNAL: u16 = 500;
    /// An upstream the controller depends on failed.
    pub const BAD_GATEWAY: u16 = 502;
    /// The action did not complete within the deadline.
    pub const TIMEOUT: u16 = 504;
}

/// A request sent to a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    pub request: Uuid,
    pub domain: String,
    pub solution: String,
    pub version: String,
    pub element: String,
    pub cluster: String,
    pub instance: String,
    pub component: String,
    pub state: State,
    pub configuration: String,
}

impl Request {
    /// Build a request from a desired-state record, minting a fresh id.
    pub fn from_target(target: &TargetState) -> Self {
        Self {
            request: Uuid::new_v4(),
            domain: target.path.domain.clone(),
            solution: target.path.solution.clone(),
            version: target.path.version.clone(),
            element: target.path.element.clone(),
            cluster: target.path.cluster.clone(),
            instance: target.path.instance.clone(),
            component: target.component.clone(),
            state: target.state,
            configuration: target.configuration.clone(),
        }
    }

    /// The instance path this request addresses.
    pub fn path(&self) -> InstancePath {
        InstancePath::new(
            self.domain.clone(),
            self.solution.clone(),
            self.version.clone(),
            self.element.clone(),
            self.cluster.clone(),
            self.instance.clone(),
        )
    }

    /// Reconstruct the desired-state record a controller should act on.
    pub fn to_target(&self) -> TargetState {
        TargetState {
            path: self.path(),
            component: self.component.clone(),
            state: self.state,
            configuration: self.configuration.clone(),
        }
    }

    pub fn encode(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::Encode)
    }

    pub fn decode(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(Error::Decode)
    }
}

/// A response returned by a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    pub request: Uuid,
    pub action: Action,
    pub code: u16,
    pub status: String,
    pub domain: String,
    pub solution: String,
    pub version: String,
    pub element: String,
    pub cluster: String,
    pub instance: String,
    pub component: String,
    pub state: State,
    pub configuration: String,
    pub endpoint: String,
}

impl Response {
    /// A successful response carrying the resulting observed state.
    pub fn success(request: &Request, action: Action, current: &CurrentState) -> Self {
        Self {
            request: request.request,
            action,
            code: code::OK,
            status: String::new(),
            domain: current.path.domain.clone(),
            solution: current.path.solution.clone(),
            version: current.path.version.clone(),
            element: current.path.element.clone(),
            cluster: current.path.cluster.clone(),
            instance: current.path.instance.clone(),
            component: current.component.clone(),
            state: current.state,
            configuration: current.configuration.clone(),
            endpoint: current.endpoint.clone(),
        }
    }

    /// A failed response. The status message explains the failure; the state
    /// reports what the controller last observed.
    pub fn failure(request: &Request, action: Action, code: u16, status: impl Into<String>) -> Self {
        Self {
            request: request.request,
            action,
            code,
            status: status.into(),
            domain: request.domain.clone(),
            solution: request.solution.clone(),
            version: request.version.clone(),
            element: request.element.clone(),
            cluster: request.cluster.clone(),
            instance: request.instance.clone(),
            component: request.component.clone(),
            state: State::Failure,
            configuration: String::new(),
            endpoint: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// The observed-state record carried by a successful response.
    pub fn into_current(self) -> CurrentState {
        CurrentState {
            path: InstancePath::new(
                self.domain,
                self.solution,
                self.version,
                self.element,
                self.cluster,
                self.instance,
            ),
            component: self.component,
            state: self.state,
            configuration: self.configuration,
            endpoint: self.endpoint,
        }
    }

    pub fn encode(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::Encode)
    }

    pub fn decode(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(Error::Decode)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn target() -> TargetState {
        TargetState {
            path: InstancePath::new("prod", "shop", "v1", "web", "frontends", "web-0"),
            component: "dummy".into(),
            state: State::Active,
            configuration: "port: 8080".into(),
        }
    }

    #[test]
    fn should_encode_requests_with_pascal_case_keys() {
        let request = Request::from_target(&target());
        let text = request.encode().unwrap();
        assert!(text.contains("Domain: prod"));
        assert!(text.contains("Instance: web-0"));
        assert!(text.contains("State: active"));
        assert!(text.contains("Configuration: 'port: 8080'"));
    }

    #[test]
    fn should_round_trip_requests() {
        let request = Request::from_target(&target());
        let decoded = Request::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.to_target(), target());
    }

    #[test]
    fn should_carry_current_state_in_success_responses() {
        let target = target();
        let request = Request::from_target(&target);
        let running =
            CurrentState::mirror(&target, State::Active).with_endpoint("http://web-0:8080");

        let response = Response::success(&request, Action::Start, &running);
        assert!(response.is_success());
        assert_eq!(response.request, request.request);
        assert_eq!(response.into_current(), running);
    }

    #[test]
    fn should_report_failure_state_in_error_responses() {
        let request = Request::from_target(&target());
        let response = Response::failure(&request, Action::Create, code::INTERNAL, "boom");
        assert!(!response.is_success());
        assert_eq!(response.state, State::Failure);
        assert_eq!(response.status, "boom");
    }

    #[test]
    fn should_reject_malformed_messages() {
        assert!(matches!(
            Response::decode("not: [valid").unwrap_err(),
            Error::Decode(_)
        ));
    }
}
