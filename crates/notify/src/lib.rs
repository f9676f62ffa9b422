//! Best-effort notification channel for lifecycle state changes.
//!
//! The dispatcher publishes one notification per committed stable state
//! change through the [`Notifier`]. Delivery is explicitly best effort: a
//! broken bus degrades the channel to an observable `Unavailable` state and
//! never blocks or fails reconciliation.

pub mod channel;
pub mod error;
pub mod sink;

pub use channel::{ChannelState, Notifier};
pub use error::{Error, Result};
pub use sink::{
    BusConnector, BusSink, HttpBusConnector, InMemoryBus, InMemoryConnector, Notification,
};
