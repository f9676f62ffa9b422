//! Orchestrator configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::Deserialize;
use stratus_dispatcher::DispatcherConfig;

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub dispatcher: DispatcherSection,
    #[serde(default)]
    pub controllers: Vec<ControllerAssignment>,
}

/// Where state-change notifications go. An empty address selects the
/// in-process bus.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_topic")]
    pub topic: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            topic: default_topic(),
        }
    }
}

fn default_topic() -> String {
    "notifications".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_action_timeout_ms")]
    pub action_timeout_ms: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for DispatcherSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            action_timeout_ms: default_action_timeout_ms(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_action_timeout_ms() -> u64 {
    10_000
}

fn default_max_concurrent() -> usize {
    10
}

impl DispatcherSection {
    pub fn to_dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            action_timeout: Duration::from_millis(self.action_timeout_ms),
            max_concurrent: self.max_concurrent,
        }
    }
}

/// Binds a component type to a controller implementation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerAssignment {
    pub component: String,
    pub kind: ControllerKind,
    /// Base URL of the controller process, for `kind = "remote"`.
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    Dummy,
    Probe,
    Remote,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("unable to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.dispatcher.poll_interval_ms > 0,
            "dispatcher.poll_interval_ms must be greater than zero"
        );
        anyhow::ensure!(
            self.dispatcher.action_timeout_ms > 0,
            "dispatcher.action_timeout_ms must be greater than zero"
        );
        Ok(())
    }
}
