//! Structured remote faults.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fault raised when a managed object reference is no longer valid.
///
/// Returned by `currentSession` when the cached session cookie refers to a
/// session the server has already discarded.
pub const MANAGED_OBJECT_NOT_FOUND: &str = "ManagedObjectNotFound";
/// Fault raised by datastore searches for a missing directory or file.
pub const FILE_NOT_FOUND: &str = "FileNotFound";
/// Fault raised when login credentials are rejected.
pub const INVALID_LOGIN: &str = "InvalidLogin";
/// Fault raised when the caller lacks a privilege.
pub const NO_PERMISSION: &str = "NoPermission";

/// Additional fault payload; `faultType` discriminates fault kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultData {
	/// Fault kind name (e.g. [`MANAGED_OBJECT_NOT_FOUND`]).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fault_type: Option<String>,
	/// Remaining fault-specific fields.
	#[serde(flatten)]
	pub detail: serde_json::Map<String, Value>,
}

/// Error object returned by the remote service instead of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
	/// JSON-RPC error code.
	pub code: i64,
	/// Human-readable fault message.
	pub message: String,
	/// Typed fault payload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<FaultData>,
}

impl Fault {
	/// Creates a typed fault, mostly useful for fakes and tests.
	pub fn new(fault_type: &str, message: impl Into<String>) -> Self {
		Self {
			code: -32000,
			message: message.into(),
			data: Some(FaultData {
				fault_type: Some(fault_type.to_string()),
				detail: serde_json::Map::new(),
			}),
		}
	}

	/// Returns the fault kind name when present.
	pub fn fault_type(&self) -> Option<&str> {
		self.data.as_ref().and_then(|d| d.fault_type.as_deref())
	}

	/// Returns `true` when the fault kind equals `fault_type`.
	pub fn is(&self, fault_type: &str) -> bool {
		self.fault_type() == Some(fault_type)
	}

	pub fn is_managed_object_not_found(&self) -> bool {
		self.is(MANAGED_OBJECT_NOT_FOUND)
	}

	pub fn is_file_not_found(&self) -> bool {
		self.is(FILE_NOT_FOUND)
	}
}

impl fmt::Display for Fault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.fault_type() {
			Some(kind) => write!(f, "{kind}: {}", self.message),
			None => write!(f, "{} (code {})", self.message, self.code),
		}
	}
}
