//! Login flows and the rule that picks one.

use std::fmt;

use tracing::{debug, info};
use vmctl::protocol::UserSession;
use vmctl::runtime::ClientCertificate;
use vmctl::{Client, SessionManager};

use crate::config::ConnectionConfig;
use crate::error::{Result, VmctlError};

/// The three mutually exclusive ways to establish a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
	/// Extension login with the client certificate; the URL username is the
	/// extension key and the password is ignored.
	Certificate,
	/// Host-local ticket for the OS user, then password login with the
	/// one-time password it points to.
	LocalTicket,
	/// Password login with the URL credentials, which may be empty.
	Password,
}

impl fmt::Display for AuthStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AuthStrategy::Certificate => f.write_str("certificate"),
			AuthStrategy::LocalTicket => f.write_str("local-ticket"),
			AuthStrategy::Password => f.write_str("password"),
		}
	}
}

/// First match wins: certificate path, then missing username, then password.
pub fn select_strategy(config: &ConnectionConfig) -> AuthStrategy {
	if config.certificate.is_some() {
		AuthStrategy::Certificate
	} else if config.username.is_empty() {
		AuthStrategy::LocalTicket
	} else {
		AuthStrategy::Password
	}
}

/// Loads the configured client certificate, if any.
///
/// The key defaults to the certificate file when no key path is set.
pub fn client_certificate(config: &ConnectionConfig) -> Result<Option<ClientCertificate>> {
	let Some(cert_path) = config.certificate.as_deref() else {
		return Ok(None);
	};
	let certificate = ClientCertificate::load(cert_path, config.private_key.as_deref())?;
	debug!(target = "vmctl.auth", cert = %cert_path.display(), "loaded client certificate");
	Ok(Some(certificate))
}

impl AuthStrategy {
	/// Runs this flow against `client`.
	///
	/// The certificate flow expects the certificate to already be attached to
	/// the client's transport.
	pub async fn login(self, client: &Client, config: &ConnectionConfig) -> Result<UserSession> {
		let manager = SessionManager::new(client);
		info!(target = "vmctl.auth", strategy = %self, "logging in");
		let session = match self {
			AuthStrategy::Certificate => manager
				.login_extension_by_certificate(&config.username, "")
				.await
				.map_err(rejected)?,
			AuthStrategy::LocalTicket => {
				let ticket = manager.acquire_local_ticket(&config.os_user).await.map_err(rejected)?;
				let password = std::fs::read_to_string(&ticket.password_file_path).map_err(|err| {
					VmctlError::Authentication(format!("failed to read local ticket {}: {err}", ticket.password_file_path))
				})?;
				manager.login(&ticket.user_name, &password).await.map_err(rejected)?
			}
			AuthStrategy::Password => manager
				.login(&config.username, config.password.as_deref().unwrap_or_default())
				.await
				.map_err(rejected)?,
		};
		debug!(target = "vmctl.auth", user = %session.user_name, "login accepted");
		Ok(session)
	}
}

/// Remote faults on login are rejections; transport errors keep their kind.
fn rejected(err: vmctl::Error) -> VmctlError {
	match err.fault() {
		Some(fault) => VmctlError::Authentication(fault.to_string()),
		None => VmctlError::Api(err),
	}
}
