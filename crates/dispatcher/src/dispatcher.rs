//! The reconciliation loop.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use stratus_model::{plan, CurrentState, InstancePath, State};
use tokio::sync::{watch, Mutex, Notify, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::Result;

/// Tuning knobs of the reconciliation loop.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// How often the sweep visits all instances.
    pub poll_interval: Duration,
    /// Deadline for a single controller action.
    pub action_timeout: Duration,
    /// How many instances may reconcile at the same time.
    pub max_concurrent: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            action_timeout: Duration::from_secs(10),
            max_concurrent: 10,
        }
    }
}

/// Result of reconciling one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Observed state matches desired state.
    Converged,
    /// An action failed; the instance is latched until its target changes.
    Failed,
    /// Another reconciliation of this instance is already in flight.
    Busy,
}

// A single convergence pass walks at most this many stable states; the
// longest legal chain (initial -> inactive -> active plus a configure hop)
// stays well below it. Hitting the bound means a controller keeps reporting
// states that make no progress.
const MAX_HOPS: usize = 8;

/// Drives the observed state of instances toward their desired state.
///
/// Per instance, actions run strictly one at a time; distinct instances
/// reconcile concurrently up to the configured limit. A failed action
/// latches its instance until a new target is set, so nothing retries
/// endlessly against a broken backend.
pub struct Dispatcher {
    ctx: Context,
    config: DispatcherConfig,
    in_flight: Mutex<HashSet<InstancePath>>,
    kick: Notify,
}

impl Dispatcher {
    pub fn new(ctx: Context, config: DispatcherConfig) -> Self {
        Self {
            ctx,
            config,
            in_flight: Mutex::new(HashSet::new()),
            kick: Notify::new(),
        }
    }

    /// Wake the loop ahead of the next poll tick, after a target change.
    pub fn trigger(&self) {
        self.kick.notify_one();
    }

    /// Reconcile one instance to convergence or first failure.
    pub async fn reconcile(&self, path: &InstancePath) -> Result<Outcome> {
        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(path.clone()) {
                debug!(%path, "reconciliation already in flight");
                return Ok(Outcome::Busy);
            }
        }

        let outcome = self.converge(path).await;

        self.in_flight.lock().await.remove(path);
        outcome
    }

    async fn converge(&self, path: &InstancePath) -> Result<Outcome> {
        for _ in 0..MAX_HOPS {
            let target = self.ctx.model.target_state(path).await?;
            let current = self.ctx.model.current_state(path).await?;

            let Some(action) = plan(&current, &target)? else {
                debug!(%path, state = %current.state, "converged");
                return Ok(Outcome::Converged);
            };

            let controller = match self.ctx.controllers.lookup(&target.component) {
                Ok(controller) => controller,
                Err(e) => {
                    return self.fail(path, &e.to_string()).await;
                }
            };

            if let Some(transient) = action.transient() {
                self.ctx.model.set_transient(path, transient).await?;
            }
            info!(%path, %action, from = %current.state, to = %target.state, "dispatching");

            // the model lock is not held across the controller call
            let result = tokio::time::timeout(
                self.config.action_timeout,
                controller.invoke(action, &target),
            )
            .await
            .unwrap_or(Err(stratus_controller::Error::Timeout {
                timeout_ms: self.config.action_timeout.as_millis() as u64,
            }));

            match result {
                Ok(reached) => {
                    self.ctx.model.commit_current(&reached).await?;
                    self.publish(path, reached.state).await;
                }
                Err(e) => {
                    return self.fail(path, &e.to_string()).await;
                }
            }
        }

        self.fail(path, "convergence made no progress").await
    }

    async fn fail(&self, path: &InstancePath, message: &str) -> Result<Outcome> {
        warn!(%path, error = message, "action failed, latching instance");
        self.ctx.model.mark_failure(path, message).await?;
        self.publish(path, State::Failure).await;
        Ok(Outcome::Failed)
    }

    async fn publish(&self, path: &InstancePath, state: State) {
        let key = path.to_string();
        self.ctx.notifier.notify(&key, &format!("{key}/{state}")).await;
    }

    /// The instances a sweep would act on: unlatched, with a pending action.
    async fn scan(&self) -> Vec<InstancePath> {
        let mut pending = Vec::new();
        for path in self.ctx.model.instances().await {
            let drifted = async {
                if self.ctx.model.is_latched(&path).await? {
                    return Ok(false);
                }
                let target = self.ctx.model.target_state(&path).await?;
                let current = self.ctx.model.current_state(&path).await?;
                plan(&current, &target).map(|action| action.is_some())
            }
            .await;

            match drifted {
                Ok(true) => pending.push(path),
                Ok(false) => {}
                // instance removed between listing and inspection
                Err(stratus_model::Error::UnknownInstance { .. }) => {}
                Err(e) => warn!(%path, error = %e, "skipping instance"),
            }
        }
        pending
    }

    /// Visit all drifted instances once, bounded by `max_concurrent`.
    ///
    /// Returns the number of instances dispatched.
    pub async fn sweep(self: &Arc<Self>) -> usize {
        let pending = self.scan().await;
        if pending.is_empty() {
            return 0;
        }

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent));
        let mut tasks = JoinSet::new();
        let dispatched = pending.len();

        for path in pending {
            let dispatcher = Arc::clone(self);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // the semaphore is never closed while tasks run
                let Ok(_permit) = permits.acquire().await else {
                    return;
                };
                if let Err(e) = dispatcher.reconcile(&path).await {
                    warn!(%path, error = %e, "reconciliation aborted");
                }
            });
        }

        while tasks.join_next().await.is_some() {}
        dispatched
    }

    /// Run sweeps until shutdown is signalled.
    ///
    /// A sweep runs on every poll tick and immediately after [`trigger`]
    /// wakes the loop.
    ///
    /// [`trigger`]: Dispatcher::trigger
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        // interval panics on a zero period
        let period = self.config.poll_interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        info!(
            poll_interval = ?self.config.poll_interval,
            action_timeout = ?self.config.action_timeout,
            "dispatcher running"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = self.kick.notified() => {
                    self.sweep().await;
                }
            }
        }
        info!("dispatcher stopped");
    }

    /// Query the live status of an instance through its controller and merge
    /// the report into the model.
    ///
    /// Caller faults (unknown component, invalid configuration) are returned
    /// as errors without touching the instance. Backend faults latch the
    /// instance into `Failure` like any failed action would.
    pub async fn status(&self, path: &InstancePath) -> Result<CurrentState> {
        let target = self.ctx.model.target_state(path).await?;
        let controller = self.ctx.controllers.lookup(&target.component)?;

        let result = tokio::time::timeout(self.config.action_timeout, controller.status(&target))
            .await
            .unwrap_or(Err(stratus_controller::Error::Timeout {
                timeout_ms: self.config.action_timeout.as_millis() as u64,
            }));

        match result {
            Ok(reported) => Ok(self.ctx.model.refresh_current(path, &reported).await?),
            Err(e) if e.is_validation() => Err(e.into()),
            Err(e) => {
                self.fail(path, &e.to_string()).await?;
                Ok(self.ctx.model.current_state(path).await?)
            }
        }
    }
}
