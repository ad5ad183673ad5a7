//! Service, session and inventory types.

use serde::{Deserialize, Serialize};

/// Reference to a server-side managed object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedObjectRef {
	/// Object type (e.g. `Folder`, `SessionManager`).
	#[serde(rename = "type")]
	pub kind: String,
	/// Server-assigned identifier (e.g. `group-d1`).
	pub value: String,
}

impl ManagedObjectRef {
	pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			value: value.into(),
		}
	}
}

impl std::fmt::Display for ManagedObjectRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.kind, self.value)
	}
}

/// Product and API identification advertised by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
	pub name: String,
	pub full_name: String,
	pub vendor: String,
	pub version: String,
	pub build: String,
	/// `HostAgent` for standalone hosts, `VirtualCenter` for managers.
	pub api_type: String,
	/// API version used for the compatibility gate (e.g. `6.0`, `6.5.x`).
	pub api_version: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub instance_uuid: Option<String>,
}

/// Root references and capabilities returned by `retrieveServiceContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
	pub about: AboutInfo,
	pub root_folder: ManagedObjectRef,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_manager: Option<ManagedObjectRef>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub search_index: Option<ManagedObjectRef>,
}

/// Server-side record of an authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
	pub key: String,
	pub user_name: String,
	#[serde(default)]
	pub full_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub login_time: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub locale: Option<String>,
}

/// Host-local one-time credential issued by the management agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTicket {
	/// Identity to log in as.
	pub user_name: String,
	/// Local file holding the one-time password.
	pub password_file_path: String,
}

/// Parameters for `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
	pub user_name: String,
	pub password: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub locale: Option<String>,
}

/// Parameters for `loginExtensionByCertificate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginByCertificateParams {
	pub extension_key: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub locale: String,
}

/// Parameters for `acquireLocalTicket`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquireLocalTicketParams {
	pub user_name: String,
}

/// Parameters for `findByInventoryPath`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindByInventoryPathParams {
	pub inventory_path: String,
}
