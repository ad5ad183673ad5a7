//! Transport abstraction for remote method calls.
//!
//! A [`RoundTripper`] sends one [`Request`] and yields either the JSON result
//! or an [`Error`](crate::Error). The session identity lives inside the
//! transport (an HTTP cookie for [`HttpTransport`]) and is exposed as a
//! serializable [`TransportState`] so it can be persisted between process
//! invocations and handed back to a [`Connector`] later.

mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use vmctl_protocol::Request;

pub use self::http::{HttpConnector, HttpTransport};
use crate::certificate::ClientCertificate;
use crate::error::Result;

/// Sends a request and returns the decoded result or fault.
#[async_trait]
pub trait RoundTripper: Send + Sync {
	/// Performs one request/response exchange.
	async fn round_trip(&self, request: Request) -> Result<Value>;

	/// Snapshot of the connection state needed to resume this session.
	fn state(&self) -> TransportState;
}

/// Builds transports from a [`TransportConfig`].
pub trait Connector: Send + Sync {
	fn connect(&self, config: TransportConfig) -> Result<Arc<dyn RoundTripper>>;
}

/// Everything needed to open a transport to one endpoint.
#[derive(Debug, Clone)]
pub struct TransportConfig {
	/// Endpoint URL without userinfo.
	pub url: Url,
	/// Skip server certificate verification.
	pub insecure: bool,
	/// RPC namespace (e.g. `urn:vim25`).
	pub namespace: String,
	/// RPC version (e.g. `6.0`).
	pub version: String,
	/// Client identity for certificate login.
	pub certificate: Option<ClientCertificate>,
	/// Session cookie to resume.
	pub cookie: Option<String>,
	/// Whole-request timeout; `None` relies on the HTTP client default.
	pub timeout: Option<Duration>,
}

impl TransportConfig {
	pub fn new(url: Url, insecure: bool, namespace: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			url,
			insecure,
			namespace: namespace.into(),
			version: version.into(),
			certificate: None,
			cookie: None,
			timeout: None,
		}
	}

	/// Attaches a client certificate.
	pub fn with_certificate(mut self, certificate: ClientCertificate) -> Self {
		self.certificate = Some(certificate);
		self
	}

	/// Resumes an existing session cookie.
	pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
		self.cookie = cookie;
		self
	}

	/// Value sent in the action header: `<namespace>/<version>`.
	pub fn action(&self) -> String {
		format!("{}/{}", self.namespace, self.version)
	}
}

/// Serializable transport state persisted alongside a session.
///
/// Never carries credentials: the URL has no userinfo and the certificate
/// itself is not stored, only whether one was attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportState {
	pub url: String,
	pub insecure: bool,
	pub namespace: String,
	pub version: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cookie: Option<String>,
	#[serde(default)]
	pub tunneled: bool,
}
