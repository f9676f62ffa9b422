//! Entity model for the orchestrator.
//!
//! Holds the hierarchy of managed entities (domain, solution, version,
//! element, cluster, instance), the lifecycle state machine, and the shared
//! [`Model`] registry that the dispatcher and external APIs operate on.
//!
//! Every instance carries a pair of records: the desired [`TargetState`] set
//! through the external API and the observed [`CurrentState`] maintained by
//! the reconciliation loop. [`state::plan`] derives the next action from the
//! difference between the two.

pub mod entity;
pub mod error;
pub mod model;
pub mod state;
pub mod target;

pub use entity::{Cluster, Domain, Element, Instance, Solution, SolutionVersion};
pub use error::{Error, Result};
pub use model::Model;
pub use state::{plan, transition, Action, State};
pub use target::{CurrentState, InstancePath, TargetState};
