//! Client side of the wire protocol: drives an out-of-process controller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stratus_model::{Action, CurrentState, TargetState};
use stratus_protocol::{Request, Responder, Response};
use tracing::debug;
use url::Url;

use crate::contract::Controller;
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Carries one request to a controller process and returns its response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, action: Action, request: &Request)
        -> stratus_protocol::Result<Response>;
}

/// Transport posting YAML envelopes to `{base}/{action}`.
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base: Url) -> Self {
        Self::with_timeout(base, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base: Url, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            timeout,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(
        &self,
        action: Action,
        request: &Request,
    ) -> stratus_protocol::Result<Response> {
        let url = format!("{}/{}", self.base.as_str().trim_end_matches('/'), action);
        let url = Url::parse(&url)
            .map_err(|e| stratus_protocol::Error::transport(format!("bad action url: {e}")))?;

        let body = request.encode()?;
        let http = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/yaml")
            .body(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    stratus_protocol::Error::DeadlineExpired {
                        ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    stratus_protocol::Error::transport(format!("post to {url} failed: {e}"))
                }
            })?;

        let text = http
            .text()
            .await
            .map_err(|e| stratus_protocol::Error::transport(format!("read from {url} failed: {e}")))?;
        Response::decode(&text)
    }
}

/// In-process transport that hands requests straight to a [`Responder`].
///
/// Used in tests and for co-located controllers; the full envelope path
/// (encode, route, decode) is still exercised.
pub struct LoopbackTransport {
    responder: Responder,
}

impl LoopbackTransport {
    pub fn new(responder: Responder) -> Self {
        Self { responder }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn exchange(
        &self,
        action: Action,
        request: &Request,
    ) -> stratus_protocol::Result<Response> {
        let request = Request::decode(&request.encode()?)?;
        let response = self.responder.handle(action, &request).await;
        Response::decode(&response.encode()?)
    }
}

/// Presents a remote controller process behind the [`Controller`] contract.
pub struct RemoteController {
    transport: Arc<dyn Transport>,
}

impl RemoteController {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Connect to a controller process over HTTP.
    pub fn http(base: Url) -> Self {
        Self::new(Arc::new(HttpTransport::new(base)))
    }

    async fn call(&self, action: Action, target: &TargetState) -> Result<CurrentState> {
        let request = Request::from_target(target);
        debug!(path = %target.path, ?action, request = %request.request, "remote call");

        let response = self
            .transport
            .exchange(action, &request)
            .await
            .map_err(|e| match e {
                stratus_protocol::Error::DeadlineExpired { ms } => Error::Timeout { timeout_ms: ms },
                other => Error::transport(other.to_string()),
            })?;

        if response.request != request.request {
            return Err(Error::transport(format!(
                "response correlates to {} instead of {}",
                response.request, request.request
            )));
        }

        if response.is_success() {
            return Ok(response.into_current());
        }

        let reason = if response.status.is_empty() {
            format!("controller returned code {}", response.code)
        } else {
            response.status.clone()
        };
        if (400..500).contains(&response.code) {
            Err(Error::Validation(reason))
        } else {
            Err(Error::Backend(reason))
        }
    }
}

#[async_trait]
impl Controller for RemoteController {
    async fn status(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Status, target).await
    }

    async fn create(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Create, target).await
    }

    async fn start(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Start, target).await
    }

    async fn stop(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Stop, target).await
    }

    async fn configure(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Configure, target).await
    }

    async fn reconfigure(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Reconfigure, target).await
    }

    async fn reset(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Reset, target).await
    }

    async fn destroy(&self, target: &TargetState) -> Result<CurrentState> {
        self.call(Action::Destroy, target).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use stratus_model::{InstancePath, State};
    use stratus_protocol::{Backend, Reject};
    use uuid::Uuid;

    use super::*;

    struct Echo;

    #[async_trait]
    impl Backend for Echo {
        async fn status(&self, request: &Request) -> std::result::Result<CurrentState, Reject> {
            Ok(CurrentState::mirror(&request.to_target(), request.state))
        }

        async fn create(&self, request: &Request) -> std::result::Result<CurrentState, Reject> {
            if request.configuration.contains("poison") {
                return Err(Reject::bad_request("poisoned configuration"));
            }
            Ok(CurrentState::mirror(&request.to_target(), State::Inactive))
        }
    }

    fn target(configuration: &str) -> TargetState {
        TargetState {
            path: InstancePath::new("prod", "shop", "v1", "web", "frontends", "web-0"),
            component: "echo".into(),
            state: State::Active,
            configuration: configuration.into(),
        }
    }

    fn loopback() -> RemoteController {
        RemoteController::new(Arc::new(LoopbackTransport::new(Responder::new(Arc::new(
            Echo,
        )))))
    }

    #[tokio::test]
    async fn should_round_trip_actions_through_the_envelope() {
        let controller = loopback();
        let current = controller.create(&target("port: 8080")).await.unwrap();
        assert_eq!(current.state, State::Inactive);
        assert_eq!(current.configuration, "port: 8080");
    }

    #[tokio::test]
    async fn should_surface_rejections_as_validation_errors() {
        let controller = loopback();
        let err = controller.create(&target("poison: true")).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.code(), 400);
    }

    struct Misrouted;

    #[async_trait]
    impl Transport for Misrouted {
        async fn exchange(
            &self,
            action: Action,
            request: &Request,
        ) -> stratus_protocol::Result<Response> {
            let mut stale = request.clone();
            stale.request = Uuid::new_v4();
            let current = CurrentState::mirror(&stale.to_target(), State::Active);
            Ok(Response::success(&stale, action, &current))
        }
    }

    #[tokio::test]
    async fn should_reject_responses_with_a_foreign_correlation_id() {
        let controller = RemoteController::new(Arc::new(Misrouted));
        let err = controller.status(&target("")).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
