//! Exposes a local [`Controller`] behind the wire protocol.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_model::CurrentState;
use stratus_protocol::{Backend, Reject, Request, Responder};

use crate::contract::Controller;

/// Adapts a controller to the protocol [`Backend`], letting any in-process
/// controller be served to remote orchestrators.
pub struct ControllerBackend {
    controller: Arc<dyn Controller>,
}

impl ControllerBackend {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }

    /// Wrap the controller in a ready-to-serve responder.
    pub fn into_responder(self) -> Responder {
        Responder::new(Arc::new(self))
    }

    fn reject(error: crate::error::Error) -> Reject {
        Reject::new(error.code(), error.to_string())
    }
}

#[async_trait]
impl Backend for ControllerBackend {
    async fn status(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .status(&request.to_target())
            .await
            .map_err(Self::reject)
    }

    async fn create(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .create(&request.to_target())
            .await
            .map_err(Self::reject)
    }

    async fn destroy(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .destroy(&request.to_target())
            .await
            .map_err(Self::reject)
    }

    async fn start(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .start(&request.to_target())
            .await
            .map_err(Self::reject)
    }

    async fn stop(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .stop(&request.to_target())
            .await
            .map_err(Self::reject)
    }

    async fn configure(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .configure(&request.to_target())
            .await
            .map_err(Self::reject)
    }

    async fn reconfigure(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .reconfigure(&request.to_target())
            .await
            .map_err(Self::reject)
    }

    async fn reset(&self, request: &Request) -> Result<CurrentState, Reject> {
        self.controller
            .reset(&request.to_target())
            .await
            .map_err(Self::reject)
    }
}
