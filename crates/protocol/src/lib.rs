//! Wire protocol between the orchestrator and remote controllers.
//!
//! Defines the YAML request/response envelopes, the response codes, and the
//! server-side [`Responder`] that routes decoded requests to a [`Backend`]
//! implementation.

pub mod error;
pub mod message;
pub mod responder;

pub use error::{Error, Result};
pub use message::{code, Request, Response};
pub use responder::{Backend, Reject, Responder};
