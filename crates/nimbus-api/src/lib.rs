// nimbus-api: Async Rust client for the Nimbus cloud management REST API

pub mod client;
pub mod error;
pub mod events;
pub mod transport;

pub use client::{ApiClient, Page};
pub use error::Error;
pub use events::{EventHandle, ReconnectConfig, ServerEvent};
pub use transport::{TlsMode, TransportConfig};
