//! Notification sinks and how to connect to them.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::{Error, Result};

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const BROADCAST_CAPACITY: usize = 256;

/// A keyed notification as it travels on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub key: String,
    pub value: String,
}

/// An established connection to the bus.
#[async_trait]
pub trait BusSink: Send + Sync {
    async fn publish(&self, notification: &Notification) -> Result<()>;
}

/// Establishes sinks. Connection is separate from publishing so the channel
/// can retry it lazily.
#[async_trait]
pub trait BusConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn BusSink>>;
}

/// In-process bus on a broadcast channel.
///
/// Publishing without any subscriber is not an error; notifications are
/// droppable by contract.
#[derive(Clone)]
pub struct InMemoryBus {
    sender: broadcast::Sender<Notification>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusSink for InMemoryBus {
    async fn publish(&self, notification: &Notification) -> Result<()> {
        // send only fails when no receiver exists, which is fine here
        let _ = self.sender.send(notification.clone());
        Ok(())
    }
}

/// Connector handing out sinks onto one shared in-memory bus.
pub struct InMemoryConnector {
    bus: InMemoryBus,
}

impl InMemoryConnector {
    pub fn new(bus: InMemoryBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl BusConnector for InMemoryConnector {
    async fn connect(&self) -> Result<Box<dyn BusSink>> {
        Ok(Box::new(self.bus.clone()))
    }
}

/// Sink posting notifications to an HTTP bus gateway.
pub struct HttpBusSink {
    client: reqwest::Client,
    url: String,
}

#[async_trait]
impl BusSink for HttpBusSink {
    async fn publish(&self, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::publish(format!("post to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::publish(format!(
                "bus at {} returned {status}",
                self.url
            )));
        }
        Ok(())
    }
}

/// Connects to an HTTP bus gateway, verifying reachability up front so a
/// dead bus is observed at connect time rather than on first publish. The
/// check is a plain GET of the topic URL; only transport-level failure
/// counts as unreachable, since gateways answer reads on a publish endpoint
/// with a range of statuses.
pub struct HttpBusConnector {
    client: reqwest::Client,
    address: String,
    topic: String,
}

impl HttpBusConnector {
    pub fn new(address: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            address: address.into(),
            topic: topic.into(),
        }
    }

    fn topic_url(&self) -> String {
        format!(
            "{}/topics/{}",
            self.address.trim_end_matches('/'),
            self.topic
        )
    }
}

#[async_trait]
impl BusConnector for HttpBusConnector {
    async fn connect(&self) -> Result<Box<dyn BusSink>> {
        let url = self.topic_url();
        self.client
            .get(&url)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::connect(format!("bus at {url} is unreachable: {e}")))?;

        Ok(Box::new(HttpBusSink {
            client: self.client.clone(),
            url,
        }))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn should_deliver_to_subscribers() {
        let bus = InMemoryBus::new();
        let mut receiver = bus.subscribe();

        let notification = Notification {
            key: "prod/shop/v1/web/frontends/web-0".into(),
            value: "prod/shop/v1/web/frontends/web-0/active".into(),
        };
        bus.publish(&notification).await.unwrap();
        assert_eq!(receiver.recv().await.unwrap(), notification);
    }

    #[tokio::test]
    async fn should_accept_publishes_without_subscribers() {
        let bus = InMemoryBus::new();
        let notification = Notification {
            key: "k".into(),
            value: "v".into(),
        };
        assert!(bus.publish(&notification).await.is_ok());
    }

    #[test]
    fn should_build_topic_urls_without_duplicate_slashes() {
        let connector = HttpBusConnector::new("http://bus:9092/", "notifications");
        assert_eq!(connector.topic_url(), "http://bus:9092/topics/notifications");
    }
}
