//! JSON-RPC 2.0 request/response envelopes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::fault::Fault;

/// JSON-RPC protocol marker carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Header carrying `<namespace>/<version>` on every request.
pub const ACTION_HEADER: &str = "X-Rpc-Action";

/// Method invocation sent to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
	/// Always [`JSONRPC_VERSION`].
	pub jsonrpc: String,
	/// Correlation id, unique per transport.
	pub id: u64,
	/// Remote method name (e.g. `login`).
	pub method: String,
	/// Method parameters as a JSON object.
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub params: Value,
}

impl Request {
	/// Builds a request with id `0`; transports assign the real id.
	pub fn new(method: impl Into<String>, params: Value) -> Self {
		Self {
			jsonrpc: JSONRPC_VERSION.to_string(),
			id: 0,
			method: method.into(),
			params,
		}
	}

	/// Returns a copy of this request carrying `id`.
	pub fn with_id(mut self, id: u64) -> Self {
		self.id = id;
		self
	}
}

/// Reply from the remote service.
///
/// Exactly one of `result` and `error` is expected. An explicit
/// `"result": null` is a result; a missing key is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
	/// Protocol marker, not validated.
	#[serde(default)]
	pub jsonrpc: String,
	/// Correlation id echoed from the request.
	#[serde(default)]
	pub id: Option<u64>,
	/// Success result (mutually exclusive with error).
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	/// Error result (mutually exclusive with result).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<Fault>,
}

impl Response {
	/// Splits the reply into its result or its fault; `None` when it
	/// carries neither.
	pub fn into_result(self) -> Option<Result<Value, Fault>> {
		match (self.error, self.result) {
			(Some(fault), _) => Some(Err(fault)),
			(None, Some(result)) => Some(Ok(result)),
			(None, None) => None,
		}
	}
}

/// Keeps a present `null` as `Some(Value::Null)`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
	Value::deserialize(deserializer).map(Some)
}
