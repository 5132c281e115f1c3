//! # Adapters
//!
//! Port implementations and transport plumbing for the gateway binary.

pub mod credentials_file;
pub mod metrics_endpoint;
pub mod publisher;
pub mod stats;
pub mod transport;

pub use credentials_file::{load_credential_store, parse_credentials, CredentialFileError};
pub use publisher::{LinePublisher, PublishError, ResponsePublisher};
pub use stats::{GatewayStats, StatsSnapshot};
pub use transport::{
    device_id_from_topic, response_topic, run_line_ingress, TransportError, TransportEvent,
    TransportFrame,
};
