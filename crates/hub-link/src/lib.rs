//! hub-link: command delivery to the physical hub controllers
//!
//! Each hub speaks newline-terminated JSON over a persistent byte stream
//! and echoes a fixed ack token once a batch has been executed. This crate
//! provides the transport abstraction with feature-gated backends (the
//! default `mock` backend keeps every flow testable on any host), the
//! ack-gated `HubLink`, a supervised reconnect policy, and the registry
//! the orchestrator is handed at startup.

mod error;
pub use error::{LinkError, Result};

mod transport;
pub use transport::{Dialer, HubTransport};

mod link;
pub use link::{HubLink, ReconnectPolicy, ACK_TOKEN};

mod registry;
pub use registry::HubRegistry;

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{MockDialer, MockScript};

#[cfg(feature = "rfcomm")]
mod rfcomm;
#[cfg(feature = "rfcomm")]
pub use rfcomm::RfcommDialer;
