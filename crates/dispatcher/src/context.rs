//! Shared handles the dispatcher operates on.

use std::sync::Arc;

use stratus_controller::ControllerRegistry;
use stratus_model::Model;
use stratus_notify::Notifier;

/// Everything a reconciliation run needs: the entity model, the controller
/// registry, and the notification channel.
#[derive(Clone)]
pub struct Context {
    pub model: Arc<Model>,
    pub controllers: Arc<ControllerRegistry>,
    pub notifier: Arc<Notifier>,
}

impl Context {
    pub fn new(
        model: Arc<Model>,
        controllers: Arc<ControllerRegistry>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            model,
            controllers,
            notifier,
        }
    }
}
