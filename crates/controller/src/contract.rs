//! The controller contract.

use async_trait::async_trait;
use stratus_model::{Action, CurrentState, TargetState};

use crate::error::Result;

/// Executes lifecycle actions against one component type.
///
/// Every method takes the full desired-state record and reports the state
/// actually reached, so controllers stay stateless between calls. The four
/// capabilities a real backend cannot fake (`create`, `start`, `stop` and
/// `status`) are mandatory; the rest default to a status probe, which keeps
/// a partial controller safe: asking it to configure something it cannot
/// configure only reports what is there.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Probe the backing system and report the observed state.
    async fn status(&self, target: &TargetState) -> Result<CurrentState>;

    /// Provision the backing resource.
    async fn create(&self, target: &TargetState) -> Result<CurrentState>;

    /// Start a provisioned resource.
    async fn start(&self, target: &TargetState) -> Result<CurrentState>;

    /// Stop a running resource without destroying it.
    async fn stop(&self, target: &TargetState) -> Result<CurrentState>;

    /// Apply configuration to a stopped resource.
    async fn configure(&self, target: &TargetState) -> Result<CurrentState> {
        self.status(target).await
    }

    /// Apply configuration to a running resource.
    async fn reconfigure(&self, target: &TargetState) -> Result<CurrentState> {
        self.status(target).await
    }

    /// Recover a failed resource.
    async fn reset(&self, target: &TargetState) -> Result<CurrentState> {
        self.status(target).await
    }

    /// Tear the backing resource down.
    async fn destroy(&self, target: &TargetState) -> Result<CurrentState> {
        self.status(target).await
    }

    /// Dispatch a single action.
    async fn invoke(&self, action: Action, target: &TargetState) -> Result<CurrentState> {
        match action {
            Action::Create => self.create(target).await,
            Action::Destroy => self.destroy(target).await,
            Action::Start => self.start(target).await,
            Action::Stop => self.stop(target).await,
            Action::Configure => self.configure(target).await,
            Action::Reconfigure => self.reconfigure(target).await,
            Action::Reset => self.reset(target).await,
            Action::Status => self.status(target).await,
        }
    }
}
