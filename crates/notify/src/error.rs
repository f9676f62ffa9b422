//! Notification errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The bus could not be reached to establish a sink.
    #[error("failed to connect to notification bus: {0}")]
    Connect(String),

    /// An established sink failed to accept a notification.
    #[error("failed to publish notification: {0}")]
    Publish(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish(message.into())
    }
}
