//! Error types for the vmctl runtime.

use std::io::ErrorKind;

use thiserror::Error;
use vmctl_protocol::Fault;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the remote service.
#[derive(Debug, Error)]
pub enum Error {
	/// Structured fault returned by the remote service. Never retried.
	#[error("{0}")]
	Fault(Fault),

	/// HTTP client error (connect, TLS handshake, body read).
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Raw I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Non-success HTTP status without a decodable fault body.
	#[error("unexpected HTTP status {status}: {body}")]
	Status { status: u16, body: String },

	/// Timeout waiting for the remote service.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Reply that is not a JSON-RPC response.
	#[error("invalid response: {0}")]
	InvalidResponse(String),

	/// TLS identity or trust configuration rejected by the HTTP client.
	#[error("TLS configuration error: {0}")]
	Tls(String),
}

impl Error {
	/// Returns the remote fault if this error carries one.
	pub fn fault(&self) -> Option<&Fault> {
		match self {
			Error::Fault(fault) => Some(fault),
			_ => None,
		}
	}

	/// Returns `true` when this is a remote fault of kind `fault_type`.
	pub fn is_fault(&self, fault_type: &str) -> bool {
		self.fault().is_some_and(|f| f.is(fault_type))
	}

	/// Returns `true` for temporary network-level errors worth retrying.
	///
	/// Remote faults are terminal: the service answered, retrying would
	/// produce the same answer.
	pub fn is_transient(&self) -> bool {
		match self {
			Error::Timeout(_) => true,
			Error::Io(err) => is_transient_io(err.kind()),
			Error::Http(err) => {
				if err.is_timeout() {
					return true;
				}
				if has_transient_io_source(err) {
					return true;
				}
				let msg = err.to_string().to_ascii_lowercase();
				msg.contains("connection reset") || msg.contains("connection closed before message completed")
			}
			_ => false,
		}
	}
}

fn is_transient_io(kind: ErrorKind) -> bool {
	matches!(
		kind,
		ErrorKind::ConnectionReset
			| ErrorKind::ConnectionAborted
			| ErrorKind::BrokenPipe
			| ErrorKind::TimedOut
			| ErrorKind::Interrupted
			| ErrorKind::WouldBlock
	)
}

fn has_transient_io_source(err: &(dyn std::error::Error + 'static)) -> bool {
	let mut source = err.source();
	while let Some(cause) = source {
		if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
			if is_transient_io(io_err.kind()) {
				return true;
			}
		}
		source = cause.source();
	}
	false
}
