//! On-disk session cache.
//!
//! A fresh login writes a [`SessionSnapshot`] (transport state plus service
//! content) under `~/.vmctl/sessions/<key>`, where the key is the SHA-1 of
//! the endpoint identity. Later invocations restore the snapshot and confirm
//! the session is still live before reusing it.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use time::OffsetDateTime;
use tracing::{debug, info};
use url::Url;
use vmctl::protocol::{MANAGED_OBJECT_NOT_FOUND, ServiceContent};
use vmctl::runtime::{Connector, TransportConfig, TransportState, attach_retries};
use vmctl::{Client, SessionManager};

use crate::auth;
use crate::config::ConnectionConfig;
use crate::error::{Result, VmctlError};

/// Current on-disk schema version for session snapshots.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// File name of a cached session: 40 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
	/// Digest of `scheme://host[:port]path#insecure=<flag>`.
	///
	/// Credentials, query and fragment never take part.
	pub fn new(url: &Url, insecure: bool) -> Self {
		let mut identity = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
		if let Some(port) = url.port() {
			identity.push_str(&format!(":{port}"));
		}
		identity.push_str(url.path());
		identity.push_str(&format!("#insecure={insecure}"));
		Self(hex::encode(Sha1::digest(identity.as_bytes())))
	}

	pub fn for_config(config: &ConnectionConfig) -> Self {
		Self::new(&config.url, config.insecure)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Serialized session: everything needed to resume without logging in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
	#[serde(default)]
	pub schema_version: u32,
	pub transport: TransportState,
	pub service_content: ServiceContent,
	/// Unix epoch seconds when the snapshot was written.
	#[serde(default)]
	pub created_at: u64,
}

impl SessionSnapshot {
	pub fn capture(client: &Client) -> Self {
		Self {
			schema_version: SNAPSHOT_SCHEMA_VERSION,
			transport: client.state(),
			service_content: client.service_content().clone(),
			created_at: now_ts(),
		}
	}

	pub fn decode(bytes: &[u8]) -> Result<Self> {
		let snapshot: Self =
			serde_json::from_slice(bytes).map_err(|err| VmctlError::Cache(format!("corrupt session snapshot: {err}")))?;
		if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
			return Err(VmctlError::Cache(format!(
				"unsupported session snapshot schema_version {} (expected {SNAPSHOT_SCHEMA_VERSION})",
				snapshot.schema_version
			)));
		}
		Ok(snapshot)
	}

	pub fn encode(&self) -> Result<Vec<u8>> {
		serde_json::to_vec_pretty(self).map_err(|err| VmctlError::Cache(format!("failed to encode session snapshot: {err}")))
	}

	/// Whether the snapshot carries usable service content.
	pub fn valid(&self) -> bool {
		!self.service_content.about.api_version.is_empty()
	}
}

/// Byte storage for snapshots, keyed by [`CacheKey`].
pub trait SessionStore: Send + Sync {
	/// Returns `None` when nothing is stored under `key`.
	fn load(&self, key: &CacheKey) -> io::Result<Option<Vec<u8>>>;

	/// Stores `bytes`, replacing previous content.
	fn save(&self, key: &CacheKey, bytes: &[u8]) -> io::Result<()>;

	/// Deletes the entry; `false` when there was none.
	fn remove(&self, key: &CacheKey) -> io::Result<bool>;

	/// Human-readable location of the entry.
	fn location(&self, key: &CacheKey) -> String;
}

/// Snapshots as owner-only files in one directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
	dir: PathBuf,
}

impl FileSessionStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	/// `~/.vmctl/sessions`.
	pub fn in_home() -> Result<Self> {
		let home = dirs::home_dir().ok_or_else(|| VmctlError::Cache("cannot determine home directory".into()))?;
		Ok(Self::new(home.join(".vmctl").join("sessions")))
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn path(&self, key: &CacheKey) -> PathBuf {
		self.dir.join(key.as_str())
	}
}

impl SessionStore for FileSessionStore {
	fn load(&self, key: &CacheKey) -> io::Result<Option<Vec<u8>>> {
		match fs::read(self.path(key)) {
			Ok(bytes) => Ok(Some(bytes)),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err),
		}
	}

	fn save(&self, key: &CacheKey, bytes: &[u8]) -> io::Result<()> {
		create_private_dir(&self.dir)?;
		write_private_file(&self.path(key), bytes)
	}

	fn remove(&self, key: &CacheKey) -> io::Result<bool> {
		match fs::remove_file(self.path(key)) {
			Ok(()) => Ok(true),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
			Err(err) => Err(err),
		}
	}

	fn location(&self, key: &CacheKey) -> String {
		self.path(key).display().to_string()
	}
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
	use std::os::unix::fs::DirBuilderExt;
	fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
	fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
	use std::io::Write;
	use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

	let mut file = fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
	file.set_permissions(fs::Permissions::from_mode(0o600))?;
	file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
	fs::write(path, bytes)
}

/// In-process store, for tests and one-shot embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
	entries: Mutex<HashMap<CacheKey, Vec<u8>>>,
}

impl MemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}
}

impl SessionStore for MemorySessionStore {
	fn load(&self, key: &CacheKey) -> io::Result<Option<Vec<u8>>> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn save(&self, key: &CacheKey, bytes: &[u8]) -> io::Result<()> {
		self.entries.lock().insert(key.clone(), bytes.to_vec());
		Ok(())
	}

	fn remove(&self, key: &CacheKey) -> io::Result<bool> {
		Ok(self.entries.lock().remove(key).is_some())
	}

	fn location(&self, key: &CacheKey) -> String {
		format!("memory:{key}")
	}
}

/// Restores and persists sessions through a [`SessionStore`].
#[derive(Clone)]
pub struct SessionCache {
	store: Arc<dyn SessionStore>,
	connector: Arc<dyn Connector>,
}

impl SessionCache {
	pub fn new(store: Arc<dyn SessionStore>, connector: Arc<dyn Connector>) -> Self {
		Self { store, connector }
	}

	/// Returns a live cached session, or `None` when there is nothing usable.
	///
	/// A missing entry, a snapshot without service content, a stale session
	/// (`ManagedObjectNotFound`) and an unauthenticated session all yield
	/// `None`. Other read, decode or validation failures are cache errors.
	pub async fn restore(&self, config: &ConnectionConfig) -> Result<Option<Client>> {
		if !config.persist_session {
			return Ok(None);
		}
		let key = CacheKey::for_config(config);
		let Some(bytes) = self.store.load(&key).map_err(|err| cache_io("read", &*self.store, &key, err))? else {
			debug!(target = "vmctl.session", key = %key, "no cached session");
			return Ok(None);
		};
		let snapshot = SessionSnapshot::decode(&bytes)?;
		if !snapshot.valid() {
			debug!(target = "vmctl.session", key = %key, "cached session has no service content");
			return Ok(None);
		}

		let Some(transport_config) = self.transport_config(&snapshot.transport, config)? else {
			return Ok(None);
		};
		let transport = self
			.connector
			.connect(transport_config)
			.map_err(|err| VmctlError::Cache(format!("failed to reopen cached session: {err}")))?;
		let client = Client::from_parts(attach_retries(transport), snapshot.service_content);

		match SessionManager::new(&client).user_session().await {
			Err(err) if err.is_fault(MANAGED_OBJECT_NOT_FOUND) => {
				debug!(target = "vmctl.session", key = %key, "cached session is stale");
				Ok(None)
			}
			Err(err) => Err(VmctlError::Cache(format!("failed to validate cached session: {err}"))),
			Ok(None) => {
				debug!(target = "vmctl.session", key = %key, "cached session is not authenticated");
				Ok(None)
			}
			Ok(Some(session)) => {
				info!(target = "vmctl.session", user = %session.user_name, "restored cached session");
				Ok(Some(client))
			}
		}
	}

	/// Writes `client`'s session under the config's key. No-op unless
	/// persistence is enabled.
	pub fn persist(&self, config: &ConnectionConfig, client: &Client) -> Result<()> {
		if !config.persist_session {
			return Ok(());
		}
		let key = CacheKey::for_config(config);
		let bytes = SessionSnapshot::capture(client).encode()?;
		self.store.save(&key, &bytes).map_err(|err| cache_io("write", &*self.store, &key, err))?;
		debug!(target = "vmctl.session", location = %self.store.location(&key), "persisted session");
		Ok(())
	}

	/// Deletes the cached entry; `false` when there was none.
	pub fn clear(&self, config: &ConnectionConfig) -> Result<bool> {
		let key = CacheKey::for_config(config);
		self.store.remove(&key).map_err(|err| cache_io("remove", &*self.store, &key, err))
	}

	/// Whether an entry exists for the config's key.
	pub fn exists(&self, config: &ConnectionConfig) -> Result<bool> {
		let key = CacheKey::for_config(config);
		Ok(self.store.load(&key).map_err(|err| cache_io("read", &*self.store, &key, err))?.is_some())
	}

	pub fn location(&self, config: &ConnectionConfig) -> String {
		self.store.location(&CacheKey::for_config(config))
	}

	/// Transport settings for resuming `state`; `None` when a tunneled
	/// session can no longer get its certificate.
	fn transport_config(&self, state: &TransportState, config: &ConnectionConfig) -> Result<Option<TransportConfig>> {
		let url = Url::parse(&state.url).map_err(|err| VmctlError::Cache(format!("cached endpoint URL {:?}: {err}", state.url)))?;
		let transport = TransportConfig::new(url, state.insecure, state.namespace.clone(), state.version.clone())
			.with_cookie(state.cookie.clone());
		if !state.tunneled {
			return Ok(Some(transport));
		}
		match auth::client_certificate(config)? {
			Some(certificate) => Ok(Some(transport.with_certificate(certificate))),
			None => {
				debug!(target = "vmctl.session", "cached session needs a client certificate, none configured");
				Ok(None)
			}
		}
	}
}

fn cache_io(action: &str, store: &dyn SessionStore, key: &CacheKey, err: io::Error) -> VmctlError {
	VmctlError::Cache(format!("failed to {action} {}: {err}", store.location(key)))
}

fn now_ts() -> u64 {
	u64::try_from(OffsetDateTime::now_utc().unix_timestamp()).unwrap_or_default()
}
