use thiserror::Error;
use vmctl::runtime::CertificateError;

use crate::config::ENV_MIN_API_VERSION;
use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, VmctlError>;

#[derive(Debug, Error)]
pub enum VmctlError {
	/// Missing or malformed connection settings.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Client certificate or key could not be loaded.
	#[error("credential error: {0}")]
	Credential(#[from] CertificateError),

	/// The service rejected the login, or the local ticket could not be used.
	#[error("authentication failed: {0}")]
	Authentication(String),

	/// Cached session unreadable, corrupt, unwritable, or failing validation.
	#[error("session cache error: {0}")]
	Cache(String),

	#[error("{0}")]
	Version(String),

	#[error("{0}")]
	NotFound(String),

	/// A previous session attempt in this invocation already failed.
	#[error("session setup already failed for this invocation")]
	BrokerFailed,

	/// Remote fault or transport failure, classified by the inner error.
	#[error(transparent)]
	Api(#[from] vmctl::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl From<vmctl::runtime::Error> for VmctlError {
	fn from(err: vmctl::runtime::Error) -> Self {
		VmctlError::Api(err.into())
	}
}

impl VmctlError {
	/// Version gate failure naming both versions and the override.
	pub fn version_too_old(required: &str, actual: &str) -> Self {
		VmctlError::Version(format!(
			"Require API version {required}, connected to API version {actual} (set {ENV_MIN_API_VERSION} to override)"
		))
	}

	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			VmctlError::InvalidConfig(_) => (ErrorCode::InvalidConfig, None),
			VmctlError::Credential(_) => (ErrorCode::CredentialError, None),
			VmctlError::Authentication(_) => (ErrorCode::AuthError, None),
			VmctlError::Cache(_) => (ErrorCode::CacheError, None),
			VmctlError::Version(_) => (ErrorCode::VersionError, None),
			VmctlError::NotFound(_) => (ErrorCode::NotFound, None),
			VmctlError::BrokerFailed => (ErrorCode::SessionError, None),
			VmctlError::Api(err) => match err.fault() {
				Some(fault) => (
					ErrorCode::RemoteFault,
					fault.fault_type().map(|kind| serde_json::json!({ "faultType": kind })),
				),
				None if matches!(err, vmctl::Error::Runtime(_)) => (ErrorCode::NetworkError, None),
				None => (ErrorCode::InternalError, None),
			},
			VmctlError::Io(_) => (ErrorCode::IoError, None),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}
