//! Orchestrator entry point.
//!
//! Wires the entity model, controller registry, notification channel and
//! reconciliation dispatcher together from a TOML configuration file and
//! runs until a shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stratus_controller::{ControllerRegistry, DummyController, ProbeController, RemoteController};
use stratus_dispatcher::{Context, Dispatcher};
use stratus_model::Model;
use stratus_notify::{BusConnector, HttpBusConnector, InMemoryBus, InMemoryConnector, Notifier};

mod config;

use config::{Config, ControllerKind};

#[derive(Debug, Parser)]
#[command(name = "stratus", about = "Multi-tier application orchestrator", version)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overriding RUST_LOG (e.g. "info,stratus_dispatcher=debug").
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let registry = build_registry(&config)?;
    info!(components = ?registry.components(), "controllers registered");

    let notifier = Arc::new(Notifier::new(build_connector(&config)));
    let model = Arc::new(Model::new());

    let ctx = Context::new(Arc::clone(&model), Arc::new(registry), Arc::clone(&notifier));
    let dispatcher = Arc::new(Dispatcher::new(
        ctx,
        config.dispatcher.to_dispatcher_config(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_handle = tokio::spawn(Arc::clone(&dispatcher).run(shutdown_rx));
    info!("orchestrator running, press ctrl-c to stop");

    signal::ctrl_c()
        .await
        .context("unable to listen for the shutdown signal")?;
    info!("shutting down");

    if shutdown_tx.send(true).is_err() {
        warn!("reconciliation loop already stopped");
    }
    loop_handle.await.context("reconciliation loop panicked")?;
    notifier.shutdown().await;

    Ok(())
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_registry(config: &Config) -> Result<ControllerRegistry> {
    let mut registry = ControllerRegistry::new();
    for assignment in &config.controllers {
        match assignment.kind {
            ControllerKind::Dummy => {
                registry.register(&assignment.component, Arc::new(DummyController::new()));
            }
            ControllerKind::Probe => {
                registry.register(&assignment.component, Arc::new(ProbeController::new()));
            }
            ControllerKind::Remote => {
                let base = url::Url::parse(&assignment.url).with_context(|| {
                    format!(
                        "controller '{}' has an invalid url '{}'",
                        assignment.component, assignment.url
                    )
                })?;
                registry.register(&assignment.component, Arc::new(RemoteController::http(base)));
            }
        }
    }
    Ok(registry)
}

fn build_connector(config: &Config) -> Arc<dyn BusConnector> {
    if config.bus.address.is_empty() {
        info!("no bus address configured, using the in-process bus");
        Arc::new(InMemoryConnector::new(InMemoryBus::new()))
    } else {
        info!(address = %config.bus.address, topic = %config.bus.topic, "using HTTP bus");
        Arc::new(HttpBusConnector::new(
            config.bus.address.clone(),
            config.bus.topic.clone(),
        ))
    }
}
