// lemvue-api: Async Rust client for the Lemmy instance API (v4)

pub mod client;
pub mod endpoint;
pub mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

pub use client::LemmyClient;
pub use endpoint::{Endpoint, HttpMethod};
pub use error::Error;
pub use transport::TransportConfig;
