//! Per-invocation state shared by commands.
//!
//! Built once in `main`, then borrowed by the command. The session and the
//! resolved folder are initialised on first use and reused afterwards.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::debug;
use vmctl::runtime::Connector;
use vmctl::{Client, Finder, Folder};

use crate::broker::{SessionBroker, SessionHandle};
use crate::cache::{SessionCache, SessionStore};
use crate::config::{ConnectionConfig, ENV_DATASTORE, InventorySelection};
use crate::error::{Result, VmctlError};

pub struct InvocationContext {
	config: ConnectionConfig,
	inventory: InventorySelection,
	broker: Mutex<SessionBroker>,
	cache: SessionCache,
	session: OnceCell<SessionHandle>,
	folder: OnceCell<Folder>,
}

impl InvocationContext {
	pub fn new(
		config: ConnectionConfig,
		inventory: InventorySelection,
		connector: Arc<dyn Connector>,
		store: Arc<dyn SessionStore>,
	) -> Self {
		let broker = SessionBroker::new(config.clone(), connector, store);
		let cache = broker.cache().clone();
		Self {
			config,
			inventory,
			broker: Mutex::new(broker),
			cache,
			session: OnceCell::new(),
			folder: OnceCell::new(),
		}
	}

	pub fn config(&self) -> &ConnectionConfig {
		&self.config
	}

	pub fn cache(&self) -> &SessionCache {
		&self.cache
	}

	/// The invocation's session, established on first call.
	pub async fn session(&self) -> Result<&SessionHandle> {
		self.session.get_or_try_init(|| self.establish()).await
	}

	async fn establish(&self) -> Result<SessionHandle> {
		self.broker.lock().await.session().await
	}

	pub async fn client(&self) -> Result<&Client> {
		Ok(self.session().await?.client())
	}

	/// The configured folder, or the inventory root when none is set.
	pub async fn folder_or_root(&self) -> Result<&Folder> {
		self.folder.get_or_try_init(|| self.resolve_folder()).await
	}

	async fn resolve_folder(&self) -> Result<Folder> {
		let client = self.client().await?;
		let Some(path) = self.inventory.folder.as_deref() else {
			return Ok(Folder::root(client));
		};
		debug!(target = "vmctl.session", folder = path, "resolving folder");
		Finder::new(client)
			.folder(path)
			.await?
			.ok_or_else(|| VmctlError::NotFound(format!("folder '{path}' not found")))
	}

	/// Name of the datastore commands operate on.
	pub fn datastore(&self) -> Result<&str> {
		self.inventory
			.datastore
			.as_deref()
			.ok_or_else(|| VmctlError::InvalidConfig(format!("specify a datastore with --ds or {ENV_DATASTORE}")))
	}

	/// Ends the session at exit; see [`SessionBroker::logout`].
	pub async fn logout(&self) -> Result<()> {
		self.broker.lock().await.logout().await
	}

	/// Logs out and forgets any cached session.
	pub async fn terminate(&self) -> Result<bool> {
		self.broker.lock().await.terminate().await
	}
}
