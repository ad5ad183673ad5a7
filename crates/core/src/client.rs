//! Client over a round tripper plus the endpoint's service content.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use vmctl_protocol::{AboutInfo, Request, ServiceContent};
use vmctl_runtime::{RoundTripper, TransportState};

use crate::error::{Error, Result};

/// Method returning the endpoint's [`ServiceContent`].
pub const RETRIEVE_SERVICE_CONTENT: &str = "retrieveServiceContent";

/// Connection to one endpoint.
///
/// Cloning is cheap: clones share the underlying transport and therefore
/// the session.
#[derive(Clone)]
pub struct Client {
	round_tripper: Arc<dyn RoundTripper>,
	service_content: ServiceContent,
}

impl std::fmt::Debug for Client {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Client")
			.field("url", &self.round_tripper.state().url)
			.field("api_version", &self.service_content.about.api_version)
			.finish()
	}
}

impl Client {
	/// Opens a client, retrieving service content through `round_tripper`.
	pub async fn new(round_tripper: Arc<dyn RoundTripper>) -> Result<Self> {
		let service_content: ServiceContent = invoke(round_tripper.as_ref(), RETRIEVE_SERVICE_CONTENT, Value::Null).await?;
		debug!(
			target = "vmctl.client",
			api_type = %service_content.about.api_type,
			api_version = %service_content.about.api_version,
			"retrieved service content"
		);
		Ok(Self {
			round_tripper,
			service_content,
		})
	}

	/// Rebuilds a client from previously retrieved service content.
	pub fn from_parts(round_tripper: Arc<dyn RoundTripper>, service_content: ServiceContent) -> Self {
		Self {
			round_tripper,
			service_content,
		}
	}

	/// Whether this client carries usable service content.
	pub fn valid(&self) -> bool {
		!self.service_content.about.api_version.is_empty()
	}

	pub fn service_content(&self) -> &ServiceContent {
		&self.service_content
	}

	pub fn about(&self) -> &AboutInfo {
		&self.service_content.about
	}

	pub fn round_tripper(&self) -> &Arc<dyn RoundTripper> {
		&self.round_tripper
	}

	/// Transport state for persisting this session.
	pub fn state(&self) -> TransportState {
		self.round_tripper.state()
	}

	/// Invokes `method` with `params`, decoding the result as `R`.
	pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
	where
		P: Serialize,
		R: DeserializeOwned,
	{
		let params = serde_json::to_value(params).map_err(|source| Error::Encode {
			method: method.to_string(),
			source,
		})?;
		invoke(self.round_tripper.as_ref(), method, params).await
	}
}

async fn invoke<R: DeserializeOwned>(round_tripper: &dyn RoundTripper, method: &str, params: Value) -> Result<R> {
	let value = round_tripper.round_trip(Request::new(method, params)).await?;
	serde_json::from_value(value).map_err(|source| Error::Decode {
		method: method.to_string(),
		source,
	})
}
