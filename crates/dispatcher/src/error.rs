//! Dispatcher error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] stratus_model::Error),

    #[error(transparent)]
    Controller(#[from] stratus_controller::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
