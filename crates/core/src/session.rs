//! Session manager calls.

use serde_json::Value;
use tracing::debug;
use vmctl_protocol::{AcquireLocalTicketParams, LocalTicket, LoginByCertificateParams, LoginParams, UserSession};

use crate::client::Client;
use crate::error::Result;

pub const LOGIN: &str = "login";
pub const LOGIN_EXTENSION_BY_CERTIFICATE: &str = "loginExtensionByCertificate";
pub const ACQUIRE_LOCAL_TICKET: &str = "acquireLocalTicket";
pub const CURRENT_SESSION: &str = "currentSession";
pub const LOGOUT: &str = "logout";

/// Authentication and session queries against one [`Client`].
pub struct SessionManager<'a> {
	client: &'a Client,
}

impl<'a> SessionManager<'a> {
	pub fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Logs in with a user name and password.
	pub async fn login(&self, user_name: &str, password: &str) -> Result<UserSession> {
		debug!(target = "vmctl.session", user = user_name, "login");
		let params = LoginParams {
			user_name: user_name.to_string(),
			password: password.to_string(),
			locale: None,
		};
		self.client.call(LOGIN, params).await
	}

	/// Logs in as an extension identified by the client certificate.
	pub async fn login_extension_by_certificate(&self, extension_key: &str, locale: &str) -> Result<UserSession> {
		debug!(target = "vmctl.session", extension = extension_key, "login by certificate");
		let params = LoginByCertificateParams {
			extension_key: extension_key.to_string(),
			locale: locale.to_string(),
		};
		self.client.call(LOGIN_EXTENSION_BY_CERTIFICATE, params).await
	}

	/// Requests a host-local one-time credential for `user_name`.
	pub async fn acquire_local_ticket(&self, user_name: &str) -> Result<LocalTicket> {
		let params = AcquireLocalTicketParams {
			user_name: user_name.to_string(),
		};
		self.client.call(ACQUIRE_LOCAL_TICKET, params).await
	}

	/// Returns the session bound to the transport, `None` when unauthenticated.
	pub async fn user_session(&self) -> Result<Option<UserSession>> {
		self.client.call(CURRENT_SESSION, Value::Null).await
	}

	pub async fn logout(&self) -> Result<()> {
		let _: Value = self.client.call(LOGOUT, Value::Null).await?;
		Ok(())
	}
}
