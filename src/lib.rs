//! # OMF Ingress Client
//!
//! A small async client for an OMF (OSIsoft Message Format) ingestion service, together with the
//! sample run that exercises it end to end.
//!
//! At a high level it provides:
//!
//! * A connection lifecycle manager that creates an ingestion connection and waits for it to become
//!   active, and deletes one and waits for it to disappear
//! * A device facade that creates and deletes an OMF type and container and sends measurements
//! * An HTTP transport with client credentials authentication (behind the `http` feature)
//! * A sample run with best-effort cleanup that reports the first failure and keeps the rest
//!
//! ## Not supported
//! The following will *not* be supported by this library
//!
//! * Compression of OMF payloads
//! * Refreshing access tokens; a token is fetched once per client
//! * Retry or backoff on transient failures
//! * More than one device or stream per run
//!
//! # Using the library
//!
//! The service is reached through two traits so that tests and other transports can stand in for
//! HTTP:
//!
//! ```ignore
//! pub trait IngressService: Send + Sync {
//!     async fn begin_create_connection(&self, spec: &OmfConnectionCreate)
//!         -> Result<OmfConnection, ApiClientError>;
//!     async fn get_connection(&self, id: &str) -> Result<OmfConnection, ApiClientError>;
//!     async fn begin_delete_connection(&self, id: &str) -> Result<(), ApiClientError>;
//!     async fn list_connections(&self) -> Result<Vec<OmfConnection>, ApiClientError>;
//! }
//!
//! pub trait OmfTransport: Send + Sync {
//!     async fn send_omf_message(&self, message: SerializedOmfMessage)
//!         -> Result<(), ApiClientError>;
//! }
//! ```
//!
//! A run is wired up once and then driven to completion:
//!
//! ```ignore
//! let settings = AppSettings::load("appsettings.json")?;
//! let admin = Arc::new(HttpClient::new(settings.admin_settings())?);
//! let device = Arc::new(HttpClient::new(settings.device_settings())?);
//!
//! let ctx = SampleContext {
//!     connections: ConnectionManager::new(admin, settings.poll_settings()),
//!     device: Device::new(device),
//!     settings,
//! };
//! sample::run(&ctx, &CancellationToken::new()).await?;
//! ```
//!
//! # Under the hood
//!
//! ### Connection states
//!
//! Connections are created and deleted asynchronously by the service. The manager polls and
//! evaluates each reported [`state::ConnectionState`] against the state it is waiting for. A
//! state it cannot progress from, or one it does not recognize, ends the wait with an error
//! instead of polling forever. Every wait is bounded by a timeout and can be cancelled.
//!
//! ### OMF messages
//!
//! Type, container and data messages are built in [`omf::message`] and serialized to JSON with
//! the `messagetype`, `action`, `messageformat` and `omfversion` headers the service expects.

pub mod api;
pub mod config;
pub mod device;
#[cfg(feature = "http")]
pub mod httpclient;
pub mod lifecycle;
pub mod measurement;
pub mod omf;
pub mod sample;
pub mod state;

pub use crate::api::{ApiClientError, ErrorKind, ServiceSettings};
pub use crate::config::AppSettings;
pub use crate::device::Device;
#[cfg(feature = "http")]
pub use crate::httpclient::HttpClient;
pub use crate::lifecycle::{ConnectionManager, PollSettings};
pub use crate::measurement::Measurement;
pub use crate::sample::{RunFailure, SampleContext};
