//! Error types for typed API calls.

use thiserror::Error;
use vmctl_protocol::Fault;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Transport or remote fault.
	#[error(transparent)]
	Runtime(#[from] vmctl_runtime::Error),

	#[error("failed to encode {method} parameters: {source}")]
	Encode {
		method: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("failed to decode {method} result: {source}")]
	Decode {
		method: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("invalid version {0:?}")]
	InvalidVersion(String),
}

impl Error {
	/// Returns the remote fault if this error carries one.
	pub fn fault(&self) -> Option<&Fault> {
		match self {
			Error::Runtime(err) => err.fault(),
			_ => None,
		}
	}

	/// Returns `true` when this is a remote fault of kind `fault_type`.
	pub fn is_fault(&self, fault_type: &str) -> bool {
		self.fault().is_some_and(|f| f.is(fault_type))
	}

	/// Returns `true` for temporary network-level errors.
	pub fn is_transient(&self) -> bool {
		matches!(self, Error::Runtime(err) if err.is_transient())
	}
}
