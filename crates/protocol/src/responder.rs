//! Server side of the protocol: routes decoded requests by action.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_model::{Action, CurrentState};

use crate::message::{code, Request, Response};

/// Why a backend declined or failed a request.
#[derive(Debug, Clone)]
pub struct Reject {
    pub code: u16,
    pub reason: String,
}

impl Reject {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::new(code::BAD_REQUEST, reason)
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(code::INTERNAL, reason)
    }
}

/// What a controller process plugs into a [`Responder`].
///
/// Only `status` is mandatory. Components without a genuine implementation
/// of an action inherit the default, which reports status instead of
/// mutating anything, so partial backends stay safe to drive.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn status(&self, request: &Request) -> Result<CurrentState, Reject>;

    async fn create(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.status(request).await
    }

    async fn destroy(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.status(request).await
    }

    async fn start(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.status(request).await
    }

    async fn stop(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.status(request).await
    }

    async fn configure(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.status(request).await
    }

    async fn reconfigure(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.status(request).await
    }

    async fn reset(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.status(request).await
    }
}

/// Routes an action to the backend and wraps the result in a response
/// carrying the request's correlation id.
pub struct Responder {
    backend: Arc<dyn Backend>,
}

impl Responder {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, action: Action, request: &Request) -> Response {
        let result = match action {
            Action::Create => self.backend.create(request).await,
            Action::Destroy => self.backend.destroy(request).await,
            Action::Start => self.backend.start(request).await,
            Action::Stop => self.backend.stop(request).await,
            Action::Configure => self.backend.configure(request).await,
            Action::Reconfigure => self.backend.reconfigure(request).await,
            Action::Reset => self.backend.reset(request).await,
            Action::Status => self.backend.status(request).await,
        };

        match result {
            Ok(current) => Response::success(request, action, &current),
            Err(reject) => Response::failure(request, action, reject.code, reject.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use stratus_model::{InstancePath, State, TargetState};

    use super::*;

    struct StatusOnly;

    #[async_trait]
    impl Backend for StatusOnly {
        async fn status(&self, request: &Request) -> Result<CurrentState, Reject> {
            if request.instance == "missing" {
                return Err(Reject::new(code::NOT_FOUND, "no such instance"));
            }
            Ok(CurrentState::mirror(&request.to_target(), request.state))
        }
    }

    fn request(instance: &str) -> Request {
        Request::from_target(&TargetState {
            path: InstancePath::new("prod", "shop", "v1", "web", "frontends", instance),
            component: "dummy".into(),
            state: State::Active,
            configuration: String::new(),
        })
    }

    #[tokio::test]
    async fn should_route_unimplemented_actions_to_status() {
        let responder = Responder::new(Arc::new(StatusOnly));
        let request = request("web-0");

        let response = responder.handle(Action::Configure, &request).await;
        assert_eq!(response.code, code::OK);
        assert_eq!(response.action, Action::Configure);
        assert_eq!(response.state, State::Active);
    }

    #[tokio::test]
    async fn should_echo_the_correlation_id() {
        let responder = Responder::new(Arc::new(StatusOnly));
        let request = request("web-0");
        let response = responder.handle(Action::Status, &request).await;
        assert_eq!(response.request, request.request);
    }

    #[tokio::test]
    async fn should_translate_rejects_into_failure_responses() {
        let responder = Responder::new(Arc::new(StatusOnly));
        let request = request("missing");
        let response = responder.handle(Action::Start, &request).await;
        assert_eq!(response.code, code::NOT_FOUND);
        assert_eq!(response.state, State::Failure);
        assert_eq!(response.status, "no such instance");
    }
}
