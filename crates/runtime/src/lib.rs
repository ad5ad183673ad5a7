//! vmctl Runtime - transport, retry policy, and client credentials
//!
//! This crate provides the low-level runtime infrastructure for talking to
//! the remote management service:
//!
//! - **Transport**: [`RoundTripper`] abstraction and the HTTP JSON-RPC
//!   implementation ([`HttpTransport`])
//! - **Connector**: factory seam ([`Connector`]) so callers can substitute
//!   scripted transports in tests
//! - **Retry**: bounded-attempt wrapper for temporary network errors
//! - **Certificates**: PEM client identity loading for certificate login
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    vmctl     │  Client, SessionManager, Finder
//! └──────┬───────┘
//!        │ Arc<dyn RoundTripper>
//! ┌──────▼───────┐
//! │ vmctl-runtime│  This crate
//! │  ┌────────┐  │
//! │  │ Retry  │  │  3 attempts, transient errors only
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │  Http  │  │  JSON-RPC over HTTPS, session cookie
//! │  └────────┘  │
//! └──────────────┘
//! ```

pub mod certificate;
pub mod error;
pub mod retry;
pub mod transport;

pub use certificate::{CertificateError, ClientCertificate};
pub use error::{Error, Result};
pub use retry::{DEFAULT_MAX_ATTEMPTS, Retry, RetryPolicy, attach_retries};
pub use transport::{Connector, HttpConnector, HttpTransport, RoundTripper, TransportConfig, TransportState};
