//! Controller contract and built-in controllers.
//!
//! A [`Controller`] executes lifecycle actions for one component type and the
//! [`ControllerRegistry`] maps component types onto controllers. Three
//! controllers ship in-tree: [`DummyController`] for demos and tests,
//! [`ProbeController`] for services managed out of band, and
//! [`RemoteController`] driving an out-of-process controller over the wire
//! protocol. [`ControllerBackend`] covers the reverse direction, serving a
//! local controller to the protocol.

pub mod contract;
pub mod dummy;
pub mod error;
pub mod probe;
pub mod registry;
pub mod remote;
pub mod server;

pub use contract::Controller;
pub use dummy::DummyController;
pub use error::{Error, Result};
pub use probe::{ProbeConfig, ProbeController};
pub use registry::ControllerRegistry;
pub use remote::{HttpTransport, LoopbackTransport, RemoteController, Transport};
pub use server::ControllerBackend;
