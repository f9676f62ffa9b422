//! Reconciliation dispatcher.
//!
//! Watches the entity model for instances whose observed state has drifted
//! from their desired state, plans the next lifecycle action, and executes
//! it through the registered controller. State changes are committed back to
//! the model and announced on the notification channel.

pub mod context;
pub mod dispatcher;
pub mod error;

pub use context::Context;
pub use dispatcher::{Dispatcher, DispatcherConfig, Outcome};
pub use error::{Error, Result};
