//! Session broker: turns a [`ConnectionConfig`] into a live session.
//!
//! ```text
//! Init ─▶ TryCache ──hit──────────────────────▶ VersionCheck ─▶ Ready
//!            │                                       ▲    │
//!            └─miss─▶ FreshLogin ─▶ persist ─────────┘    └──▶ Failed
//! ```
//!
//! `Ready` and `Failed` are terminal. The broker runs the machine at most
//! once per invocation; later calls return the cached handle or
//! [`VmctlError::BrokerFailed`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use vmctl::protocol::AboutInfo;
use vmctl::runtime::{Connector, TransportConfig, attach_retries};
use vmctl::{Client, SessionManager};

use crate::auth::{self, AuthStrategy, select_strategy};
use crate::cache::{SessionCache, SessionStore};
use crate::config::ConnectionConfig;
use crate::error::{Result, VmctlError};
use crate::version_gate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerState {
	Init,
	TryCache,
	FreshLogin,
	VersionCheck,
	Ready,
	Failed,
}

/// How the session was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSource {
	Cache,
	Login(AuthSource),
}

/// Strategy that produced a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthSource {
	Certificate,
	LocalTicket,
	Password,
}

impl From<AuthStrategy> for AuthSource {
	fn from(strategy: AuthStrategy) -> Self {
		match strategy {
			AuthStrategy::Certificate => AuthSource::Certificate,
			AuthStrategy::LocalTicket => AuthSource::LocalTicket,
			AuthStrategy::Password => AuthSource::Password,
		}
	}
}

/// Live, version-checked, retry-wrapped session.
///
/// Clones share the transport; commands borrow the client for calls.
#[derive(Debug, Clone)]
pub struct SessionHandle {
	client: Client,
	source: SessionSource,
}

impl SessionHandle {
	pub fn client(&self) -> &Client {
		&self.client
	}

	pub fn source(&self) -> SessionSource {
		self.source
	}

	pub fn about(&self) -> &AboutInfo {
		self.client.about()
	}
}

pub struct SessionBroker {
	config: ConnectionConfig,
	connector: Arc<dyn Connector>,
	cache: SessionCache,
	state: BrokerState,
	handle: Option<SessionHandle>,
}

impl SessionBroker {
	pub fn new(config: ConnectionConfig, connector: Arc<dyn Connector>, store: Arc<dyn SessionStore>) -> Self {
		let cache = SessionCache::new(store, Arc::clone(&connector));
		Self {
			config,
			connector,
			cache,
			state: BrokerState::Init,
			handle: None,
		}
	}

	pub fn config(&self) -> &ConnectionConfig {
		&self.config
	}

	pub fn cache(&self) -> &SessionCache {
		&self.cache
	}

	pub fn state(&self) -> BrokerState {
		self.state
	}

	/// Returns the session, establishing it on first use.
	pub async fn session(&mut self) -> Result<SessionHandle> {
		match self.state {
			BrokerState::Ready => {
				if let Some(handle) = &self.handle {
					return Ok(handle.clone());
				}
			}
			BrokerState::Failed => return Err(VmctlError::BrokerFailed),
			_ => {}
		}

		match self.establish().await {
			Ok(handle) => {
				self.transition(BrokerState::Ready);
				self.handle = Some(handle.clone());
				Ok(handle)
			}
			Err(err) => {
				warn!(target = "vmctl.broker", from = ?self.state, error = %err, "session setup failed");
				self.transition(BrokerState::Failed);
				Err(err)
			}
		}
	}

	async fn establish(&mut self) -> Result<SessionHandle> {
		self.transition(BrokerState::Init);
		self.config.validate()?;

		self.transition(BrokerState::TryCache);
		let handle = match self.cache.restore(&self.config).await? {
			Some(client) => SessionHandle {
				client,
				source: SessionSource::Cache,
			},
			None => {
				self.transition(BrokerState::FreshLogin);
				let (client, strategy) = self.fresh_login().await?;
				self.cache.persist(&self.config, &client)?;
				SessionHandle {
					client,
					source: SessionSource::Login(strategy.into()),
				}
			}
		};

		self.transition(BrokerState::VersionCheck);
		version_gate::check_client(handle.client(), &self.config.min_api_version)?;
		Ok(handle)
	}

	async fn fresh_login(&self) -> Result<(Client, AuthStrategy)> {
		let strategy = select_strategy(&self.config);
		let mut transport_config = TransportConfig::new(
			self.config.url.clone(),
			self.config.insecure,
			self.config.namespace.clone(),
			self.config.version.clone(),
		);
		if strategy == AuthStrategy::Certificate {
			if let Some(certificate) = auth::client_certificate(&self.config)? {
				transport_config = transport_config.with_certificate(certificate);
			}
		}

		let transport = attach_retries(self.connector.connect(transport_config)?);
		let client = Client::new(transport).await?;
		let session = strategy.login(&client, &self.config).await?;
		info!(target = "vmctl.broker", user = %session.user_name, strategy = %strategy, "logged in");
		Ok((client, strategy))
	}

	/// Ends the session at process exit.
	///
	/// No-op when persisting sessions or when none was established.
	pub async fn logout(&mut self) -> Result<()> {
		if self.config.persist_session {
			return Ok(());
		}
		let Some(handle) = self.handle.take() else {
			return Ok(());
		};
		SessionManager::new(handle.client()).logout().await?;
		debug!(target = "vmctl.broker", "logged out");
		Ok(())
	}

	/// Logs out a cached session without logging in first, then removes
	/// the cache entry. Returns whether a live session was ended.
	pub async fn terminate(&mut self) -> Result<bool> {
		let client = match self.handle.take() {
			Some(handle) => Some(handle.client),
			None => self.cache.restore(&self.config).await?,
		};
		let ended = match client {
			Some(client) => {
				SessionManager::new(&client).logout().await?;
				true
			}
			None => false,
		};
		self.cache.clear(&self.config)?;
		self.state = BrokerState::Init;
		Ok(ended)
	}

	fn transition(&mut self, next: BrokerState) {
		debug!(target = "vmctl.broker", from = ?self.state, to = ?next, "state transition");
		self.state = next;
	}
}
