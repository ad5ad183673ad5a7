//! Connection configuration layered from flags, environment and defaults.
//!
//! Every setting resolves as explicit flag > `VMCTL_*` environment variable >
//! built-in default. The endpoint URL is the only required setting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use tracing::debug;
use url::Url;

use crate::error::{Result, VmctlError};

pub const ENV_URL: &str = "VMCTL_URL";
pub const ENV_USERNAME: &str = "VMCTL_USERNAME";
pub const ENV_PASSWORD: &str = "VMCTL_PASSWORD";
pub const ENV_CERTIFICATE: &str = "VMCTL_CERTIFICATE";
pub const ENV_PRIVATE_KEY: &str = "VMCTL_PRIVATE_KEY";
pub const ENV_INSECURE: &str = "VMCTL_INSECURE";
pub const ENV_PERSIST_SESSION: &str = "VMCTL_PERSIST_SESSION";
pub const ENV_MIN_API_VERSION: &str = "VMCTL_MIN_API_VERSION";
pub const ENV_RPC_NAMESPACE: &str = "VMCTL_RPC_NAMESPACE";
pub const ENV_RPC_VERSION: &str = "VMCTL_RPC_VERSION";
pub const ENV_FOLDER: &str = "VMCTL_FOLDER";
pub const ENV_DATASTORE: &str = "VMCTL_DATASTORE";
/// OS account used for local ticket requests.
pub const ENV_OS_USER: &str = "USER";

pub const DEFAULT_MIN_API_VERSION: &str = "5.5";
/// `VMCTL_MIN_API_VERSION` value that turns the version check off.
pub const VERSION_CHECK_DISABLED: &str = "-";
pub const DEFAULT_RPC_NAMESPACE: &str = "urn:vim25";
pub const DEFAULT_RPC_VERSION: &str = "6.0";
pub const DEFAULT_PATH: &str = "/sdk";

/// Environment variable lookup.
///
/// Empty values count as unset.
pub trait Environ {
	fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnviron;

impl Environ for ProcessEnviron {
	fn var(&self, key: &str) -> Option<String> {
		std::env::var(key).ok().filter(|v| !v.is_empty())
	}
}

impl Environ for HashMap<String, String> {
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).filter(|v| !v.is_empty()).cloned()
	}
}

impl Environ for HashMap<&str, &str> {
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).filter(|v| !v.is_empty()).map(|v| v.to_string())
	}
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
	pub url: Option<String>,
	pub username: Option<String>,
	pub password: Option<String>,
	pub certificate: Option<PathBuf>,
	pub private_key: Option<PathBuf>,
	pub insecure: Option<String>,
	pub persist_session: Option<String>,
	pub min_api_version: Option<String>,
	pub namespace: Option<String>,
	pub version: Option<String>,
	pub folder: Option<String>,
	pub datastore: Option<String>,
}

/// Resolved, immutable connection settings for one invocation.
#[derive(Clone)]
pub struct ConnectionConfig {
	/// Endpoint URL with userinfo removed.
	pub url: Url,
	/// Port as written, kept even when it equals the scheme default.
	port: Option<u16>,
	pub username: String,
	pub password: Option<String>,
	pub certificate: Option<PathBuf>,
	pub private_key: Option<PathBuf>,
	pub insecure: bool,
	pub persist_session: bool,
	pub min_api_version: String,
	pub namespace: String,
	pub version: String,
	/// Host OS account for local ticket login.
	pub os_user: String,
	/// Settings given by flag or environment, in `VMCTL_*` key order.
	settings: Vec<(&'static str, String)>,
}

impl std::fmt::Debug for ConnectionConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConnectionConfig")
			.field("url", &self.url.as_str())
			.field("username", &self.username)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.field("certificate", &self.certificate)
			.field("insecure", &self.insecure)
			.field("persist_session", &self.persist_session)
			.field("min_api_version", &self.min_api_version)
			.finish_non_exhaustive()
	}
}

impl ConnectionConfig {
	/// Resolves the configuration from `overrides` layered over `env`.
	pub fn resolve(overrides: &ConnectionOverrides, env: &impl Environ) -> Result<Self> {
		let raw_url = given(&overrides.url)
			.or_else(|| env.var(ENV_URL))
			.ok_or_else(|| VmctlError::InvalidConfig(format!("specify an endpoint URL with --url or {ENV_URL}")))?;
		let mut url = parse_url(&raw_url)?;
		let port = explicit_port(&raw_url, &url);

		let mut username = decode_userinfo(url.username());
		let mut password = url.password().map(decode_userinfo);
		if let Some(value) = given(&overrides.username).or_else(|| env.var(ENV_USERNAME)) {
			username = value;
		}
		if let Some(value) = given(&overrides.password).or_else(|| env.var(ENV_PASSWORD)) {
			password = Some(value);
		}
		strip_userinfo(&mut url)?;

		let mut settings = Vec::new();
		let mut layered = |key: &'static str, explicit: &Option<String>| -> Option<String> {
			let value = given(explicit).or_else(|| env.var(key))?;
			settings.push((key, value.clone()));
			Some(value)
		};

		let certificate = layered(ENV_CERTIFICATE, &overrides.certificate.as_deref().map(path_string)).map(PathBuf::from);
		let private_key = layered(ENV_PRIVATE_KEY, &overrides.private_key.as_deref().map(path_string)).map(PathBuf::from);
		let insecure = parse_flag(layered(ENV_INSECURE, &overrides.insecure).as_deref(), false);
		let persist_session = parse_flag(layered(ENV_PERSIST_SESSION, &overrides.persist_session).as_deref(), true);
		let min_api_version =
			layered(ENV_MIN_API_VERSION, &overrides.min_api_version).unwrap_or_else(|| DEFAULT_MIN_API_VERSION.to_string());
		let namespace = layered(ENV_RPC_NAMESPACE, &overrides.namespace).unwrap_or_else(|| DEFAULT_RPC_NAMESPACE.to_string());
		let version = layered(ENV_RPC_VERSION, &overrides.version).unwrap_or_else(|| DEFAULT_RPC_VERSION.to_string());

		let config = Self {
			url,
			port,
			username,
			password,
			certificate,
			private_key,
			insecure,
			persist_session,
			min_api_version,
			namespace,
			version,
			os_user: env.var(ENV_OS_USER).unwrap_or_default(),
			settings,
		};
		debug!(target = "vmctl.config", url = %config.url, insecure, persist_session, "resolved connection config");
		Ok(config)
	}

	/// Checks the invariants a session attempt relies on.
	pub fn validate(&self) -> Result<()> {
		if self.url.host_str().is_none_or(str::is_empty) {
			return Err(VmctlError::InvalidConfig(format!("endpoint URL {} has no host", self.url)));
		}
		if self.private_key.is_some() && self.certificate.is_none() {
			return Err(VmctlError::InvalidConfig(format!("{ENV_PRIVATE_KEY} requires {ENV_CERTIFICATE}")));
		}
		Ok(())
	}

	/// Whether the minimum API version check is turned off.
	pub fn version_check_disabled(&self) -> bool {
		self.min_api_version == VERSION_CHECK_DISABLED
	}

	/// Port written in the endpoint URL, if any.
	pub fn port(&self) -> Option<u16> {
		self.port
	}

	/// Settings that came from a flag or the environment, in key order.
	pub fn settings(&self) -> &[(&'static str, String)] {
		&self.settings
	}
}

/// Inventory defaults for commands that need a folder or datastore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySelection {
	/// Inventory path; `None` selects the root folder.
	pub folder: Option<String>,
	pub datastore: Option<String>,
}

impl InventorySelection {
	pub fn resolve(overrides: &ConnectionOverrides, env: &impl Environ) -> Self {
		Self {
			folder: overrides.folder.clone().or_else(|| env.var(ENV_FOLDER)).filter(|v| !v.is_empty()),
			datastore: overrides.datastore.clone().or_else(|| env.var(ENV_DATASTORE)).filter(|v| !v.is_empty()),
		}
	}
}

/// Parses a boolean-like setting: `1`/`true` and `0`/`false` in any case;
/// anything else, including absence, yields `default`.
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
	match value.map(str::to_lowercase).as_deref() {
		Some("1") | Some("true") => true,
		Some("0") | Some("false") => false,
		_ => default,
	}
}

/// Parses an endpoint URL, defaulting the scheme to `https` and an empty
/// path to `/sdk`.
pub fn parse_url(raw: &str) -> Result<Url> {
	let raw = raw.trim();
	let candidate = if raw.contains("://") {
		raw.to_string()
	} else {
		format!("https://{raw}")
	};
	let mut url = Url::parse(&candidate).map_err(|err| VmctlError::InvalidConfig(format!("invalid endpoint URL {raw:?}: {err}")))?;
	if url.cannot_be_a_base() || url.host_str().is_none() {
		return Err(VmctlError::InvalidConfig(format!("invalid endpoint URL {raw:?}: missing host")));
	}
	if url.path().is_empty() || url.path() == "/" {
		url.set_path(DEFAULT_PATH);
	}
	Ok(url)
}

/// Port spelled out in `raw`. `Url` forgets a port equal to the scheme
/// default, so the authority is inspected directly in that case.
fn explicit_port(raw: &str, url: &Url) -> Option<u16> {
	if let Some(port) = url.port() {
		return Some(port);
	}
	let raw = raw.trim();
	let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
	let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
	let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
	let (_, port) = host.rsplit_once(':')?;
	port.parse().ok()
}

/// An explicit value; empty counts as unset.
fn given(value: &Option<String>) -> Option<String> {
	value.clone().filter(|v| !v.is_empty())
}

fn strip_userinfo(url: &mut Url) -> Result<()> {
	if url.set_username("").is_err() || url.set_password(None).is_err() {
		return Err(VmctlError::InvalidConfig(format!("endpoint URL {url} cannot carry credentials")));
	}
	Ok(())
}

fn decode_userinfo(raw: &str) -> String {
	percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn path_string(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}
