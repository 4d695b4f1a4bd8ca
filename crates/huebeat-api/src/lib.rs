// huebeat-api: Async Rust client for a lighting bridge's local HTTP API

pub mod client;
pub mod error;
pub mod resource;
pub mod response;
pub mod transport;

pub use client::BridgeClient;
pub use error::Error;
pub use resource::ResourceType;
pub use response::{BridgeError, BridgeErrorKind, Decoded, decode_errors};
pub use transport::TransportConfig;
