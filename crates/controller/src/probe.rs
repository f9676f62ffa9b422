//! Controller that checks a managed service over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use stratus_model::{CurrentState, State, TargetState};
use tracing::debug;

use crate::contract::Controller;
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection parameters carried in the instance configuration.
#[derive(Debug, Deserialize)]
pub struct ProbeConfig {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Token", default)]
    pub token: String,
}

impl ProbeConfig {
    /// Parse the YAML configuration block of an instance.
    ///
    /// A parse failure is the caller's fault and maps to a validation error.
    pub fn parse(configuration: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(configuration)
            .map_err(|e| Error::validation(format!("unable to parse configuration: {e}")))?;
        if config.url.is_empty() {
            return Err(Error::validation("configuration is missing URL"));
        }
        Ok(config)
    }

    /// The endpoint block published once the service is reachable.
    pub fn endpoint(&self) -> String {
        format!("URL: {}\nToken: {}", self.url, self.token)
    }
}

/// Controller for services that are managed out of band and only probed.
///
/// Lifecycle actions do not mutate anything: create, start and stop all
/// delegate to a status probe. A reachable service reports `Active` with its
/// connection parameters as the endpoint; an unreachable one is a backend
/// failure.
pub struct ProbeController {
    client: reqwest::Client,
    timeout: Duration,
}

impl ProbeController {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn probe(&self, target: &TargetState) -> Result<CurrentState> {
        let config = ProbeConfig::parse(&target.configuration)?;

        let mut request = self.client.get(&config.url).timeout(self.timeout);
        if !config.token.is_empty() {
            request = request.bearer_auth(&config.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::backend(format!("probe of {} failed: {e}", config.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::backend(format!(
                "probe of {} returned {status}",
                config.url
            )));
        }

        debug!(path = %target.path, url = %config.url, "probe succeeded");
        Ok(CurrentState::mirror(target, State::Active).with_endpoint(config.endpoint()))
    }
}

impl Default for ProbeController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Controller for ProbeController {
    async fn status(&self, target: &TargetState) -> Result<CurrentState> {
        self.probe(target).await
    }

    async fn create(&self, target: &TargetState) -> Result<CurrentState> {
        self.probe(target).await
    }

    async fn start(&self, target: &TargetState) -> Result<CurrentState> {
        self.probe(target).await
    }

    async fn stop(&self, target: &TargetState) -> Result<CurrentState> {
        self.probe(target).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use stratus_model::InstancePath;

    use super::*;

    fn target(configuration: &str) -> TargetState {
        TargetState {
            path: InstancePath::new("prod", "shop", "v1", "db", "primaries", "db-0"),
            component: "probe".into(),
            state: State::Active,
            configuration: configuration.into(),
        }
    }

    #[test]
    fn should_parse_url_and_token() {
        let config = ProbeConfig::parse("URL: http://db-0:5432\nToken: secret").unwrap();
        assert_eq!(config.url, "http://db-0:5432");
        assert_eq!(config.token, "secret");
        assert_eq!(config.endpoint(), "URL: http://db-0:5432\nToken: secret");
    }

    #[test]
    fn should_treat_malformed_configuration_as_validation_error() {
        let err = ProbeConfig::parse("not: [valid").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn should_require_a_url() {
        let err = ProbeConfig::parse("Token: secret").unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn should_report_unreachable_services_as_backend_failures() {
        let controller = ProbeController::with_timeout(Duration::from_millis(200));
        // unroutable TEST-NET-1 address, the probe cannot succeed
        let err = controller
            .status(&target("URL: http://192.0.2.1:1\nToken: x"))
            .await
            .unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(err.code(), 500);
    }

    #[tokio::test]
    async fn should_fail_validation_before_touching_the_network() {
        let controller = ProbeController::new();
        let err = controller.create(&target("nonsense")).await.unwrap_err();
        assert_eq!(err.code(), 400);
    }
}
