//! JSON-RPC over HTTP(S) transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use serde_json::Value;
use tracing::trace;
use url::Url;
use vmctl_protocol::{ACTION_HEADER, Request, Response};

use super::{Connector, RoundTripper, TransportConfig, TransportState};
use crate::error::{Error, Result};

/// HTTP transport posting JSON-RPC envelopes to the endpoint URL.
///
/// The `name=value` pair of the most recent `Set-Cookie` returned by the
/// service is the session cookie; it is echoed on every later request.
pub struct HttpTransport {
	client: reqwest::Client,
	url: Url,
	insecure: bool,
	namespace: String,
	version: String,
	action: String,
	tunneled: bool,
	cookie: Mutex<Option<String>>,
	last_id: AtomicU64,
}

impl HttpTransport {
	pub fn new(config: TransportConfig) -> Result<Self> {
		let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(config.insecure);
		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}
		let tunneled = config.certificate.is_some();
		if let Some(certificate) = &config.certificate {
			let identity = reqwest::Identity::from_pem(certificate.pem()).map_err(|err| Error::Tls(err.to_string()))?;
			builder = builder.identity(identity);
		}
		let client = builder.build()?;
		let action = config.action();

		Ok(Self {
			client,
			url: config.url,
			insecure: config.insecure,
			namespace: config.namespace,
			version: config.version,
			action,
			tunneled,
			cookie: Mutex::new(config.cookie),
			last_id: AtomicU64::new(0),
		})
	}

	/// Current session cookie, if the service has issued one.
	pub fn cookie(&self) -> Option<String> {
		self.cookie.lock().clone()
	}
}

#[async_trait]
impl RoundTripper for HttpTransport {
	async fn round_trip(&self, request: Request) -> Result<Value> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
		let request = request.with_id(id);
		trace!(target = "vmctl.transport", id, method = %request.method, "sending request");

		let mut builder = self.client.post(self.url.clone()).header(ACTION_HEADER, &self.action).json(&request);
		if let Some(cookie) = self.cookie() {
			builder = builder.header(COOKIE, cookie);
		}

		let response = builder.send().await?;
		if let Some(cookie) = session_cookie(response.headers()) {
			*self.cookie.lock() = Some(cookie);
		}

		let status = response.status();
		let body = response.bytes().await?;
		let reply = serde_json::from_slice::<Response>(&body).map(Response::into_result);
		match reply {
			Ok(Some(Err(fault))) => Err(Error::Fault(fault)),
			Ok(Some(Ok(result))) if status.is_success() => Ok(result),
			_ if !status.is_success() => Err(Error::Status {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&body).into_owned(),
			}),
			Ok(_) => Err(Error::InvalidResponse(format!(
				"{} reply carries neither result nor error",
				request.method
			))),
			Err(err) => Err(Error::InvalidResponse(err.to_string())),
		}
	}

	fn state(&self) -> TransportState {
		TransportState {
			url: self.url.to_string(),
			insecure: self.insecure,
			namespace: self.namespace.clone(),
			version: self.version.clone(),
			cookie: self.cookie(),
			tunneled: self.tunneled,
		}
	}
}

/// Opens [`HttpTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
	fn connect(&self, config: TransportConfig) -> Result<Arc<dyn RoundTripper>> {
		Ok(Arc::new(HttpTransport::new(config)?))
	}
}

/// Extracts the `name=value` pair of the first `Set-Cookie` header.
pub(super) fn session_cookie(headers: &HeaderMap) -> Option<String> {
	let raw = headers.get(SET_COOKIE)?.to_str().ok()?;
	let pair = raw.split(';').next()?.trim();
	if pair.contains('=') { Some(pair.to_string()) } else { None }
}
