//! The best-effort notification channel.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::sink::{BusConnector, BusSink, Notification};

/// Health of the channel as observed by operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No connection has been attempted yet.
    Disconnected,
    /// A sink is established and the last publish succeeded.
    Ready,
    /// The last connect or publish failed; the next notification retries.
    Unavailable,
}

struct Slot {
    sink: Option<Box<dyn BusSink>>,
    state: ChannelState,
}

/// Publishes state-change notifications without ever failing the caller.
///
/// The connection is established lazily on first use and re-established
/// after a failure; a bus that stays down degrades the channel to
/// `Unavailable` while reconciliation continues unaffected. Publishing is
/// serialized so at most one connect attempt is in flight.
pub struct Notifier {
    connector: Arc<dyn BusConnector>,
    slot: Mutex<Slot>,
}

impl Notifier {
    pub fn new(connector: Arc<dyn BusConnector>) -> Self {
        Self {
            connector,
            slot: Mutex::new(Slot {
                sink: None,
                state: ChannelState::Disconnected,
            }),
        }
    }

    /// Publish one keyed notification, best effort.
    ///
    /// Failures are logged and recorded in the channel state; they never
    /// propagate to the caller.
    pub async fn notify(&self, key: &str, value: &str) {
        let mut slot = self.slot.lock().await;

        if slot.sink.is_none() {
            match self.connector.connect().await {
                Ok(sink) => {
                    debug!("notification bus connected");
                    slot.sink = Some(sink);
                }
                Err(e) => {
                    warn!(error = %e, "notification bus unavailable, dropping notification");
                    slot.state = ChannelState::Unavailable;
                    return;
                }
            }
        }

        let notification = Notification {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        let published = match &slot.sink {
            Some(sink) => sink.publish(&notification).await,
            None => return,
        };

        match published {
            Ok(()) => {
                slot.state = ChannelState::Ready;
                debug!(key, value, "notification published");
            }
            Err(e) => {
                warn!(error = %e, key, "publish failed, dropping notification");
                // drop the sink so the next notification reconnects
                slot.sink = None;
                slot.state = ChannelState::Unavailable;
            }
        }
    }

    /// The channel's current health.
    pub async fn state(&self) -> ChannelState {
        self.slot.lock().await.state
    }

    /// Tear the connection down. Later notifications reconnect lazily.
    pub async fn shutdown(&self) {
        let mut slot = self.slot.lock().await;
        slot.sink = None;
        slot.state = ChannelState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{Error, Result};
    use crate::sink::{InMemoryBus, InMemoryConnector};

    #[tokio::test]
    async fn should_connect_lazily_on_first_notification() {
        let bus = InMemoryBus::new();
        let notifier = Notifier::new(Arc::new(InMemoryConnector::new(bus.clone())));
        assert_eq!(notifier.state().await, ChannelState::Disconnected);

        let mut receiver = bus.subscribe();
        notifier.notify("a/b", "a/b/active").await;
        assert_eq!(notifier.state().await, ChannelState::Ready);

        let seen = receiver.recv().await.unwrap();
        assert_eq!(seen.key, "a/b");
        assert_eq!(seen.value, "a/b/active");
    }

    struct DeadBus {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl BusConnector for DeadBus {
        async fn connect(&self) -> Result<Box<dyn BusSink>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::connect("nobody home"))
        }
    }

    #[tokio::test]
    async fn should_degrade_and_retry_when_the_bus_is_down() {
        let connector = Arc::new(DeadBus {
            attempts: AtomicUsize::new(0),
        });
        let notifier = Notifier::new(connector.clone());

        notifier.notify("k", "v").await;
        assert_eq!(notifier.state().await, ChannelState::Unavailable);

        // every notification retries the connection once
        notifier.notify("k", "v").await;
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn should_reconnect_after_shutdown() {
        let bus = InMemoryBus::new();
        let notifier = Notifier::new(Arc::new(InMemoryConnector::new(bus.clone())));

        notifier.notify("k", "v").await;
        notifier.shutdown().await;
        assert_eq!(notifier.state().await, ChannelState::Disconnected);

        let mut receiver = bus.subscribe();
        notifier.notify("k2", "v2").await;
        assert_eq!(notifier.state().await, ChannelState::Ready);
        assert_eq!(receiver.recv().await.unwrap().key, "k2");
    }
}
