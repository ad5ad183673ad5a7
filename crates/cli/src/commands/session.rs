use std::io::{self, Write};

use serde::Serialize;
use vmctl::SessionManager;

use crate::broker::{AuthSource, SessionSource};
use crate::context::InvocationContext;
use crate::error::Result;
use crate::output::TextOutput;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
	pub source: SessionSource,
	pub user_name: Option<String>,
	pub api_version: String,
	/// Cache file, when sessions persist.
	pub cache: Option<String>,
}

pub async fn login(ctx: &InvocationContext) -> Result<LoginOutput> {
	let handle = ctx.session().await?;
	let session = SessionManager::new(handle.client()).user_session().await?;
	let config = ctx.config();
	Ok(LoginOutput {
		source: handle.source(),
		user_name: session.map(|s| s.user_name),
		api_version: handle.about().api_version.clone(),
		cache: config.persist_session.then(|| ctx.cache().location(config)),
	})
}

impl TextOutput for LoginOutput {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		let via = match self.source {
			SessionSource::Cache => "cached session",
			SessionSource::Login(AuthSource::Certificate) => "certificate",
			SessionSource::Login(AuthSource::LocalTicket) => "local ticket",
			SessionSource::Login(AuthSource::Password) => "password",
		};
		let user = self.user_name.as_deref().unwrap_or("-");
		writeln!(out, "Logged in as {user} via {via} (API version {})", self.api_version)?;
		if let Some(cache) = &self.cache {
			writeln!(out, "Session cached at {cache}")?;
		}
		Ok(())
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutOutput {
	/// Whether a live session was ended.
	pub ended: bool,
}

pub async fn logout(ctx: &InvocationContext) -> Result<LogoutOutput> {
	Ok(LogoutOutput {
		ended: ctx.terminate().await?,
	})
}

impl TextOutput for LogoutOutput {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		if self.ended {
			writeln!(out, "Logged out")
		} else {
			writeln!(out, "No active session")
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
	pub location: String,
	pub exists: bool,
	pub persist: bool,
}

pub fn status(ctx: &InvocationContext) -> Result<CacheStatus> {
	let config = ctx.config();
	Ok(CacheStatus {
		location: ctx.cache().location(config),
		exists: ctx.cache().exists(config)?,
		persist: config.persist_session,
	})
}

impl TextOutput for CacheStatus {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		let state = if self.exists { "present" } else { "absent" };
		writeln!(out, "{} ({state})", self.location)?;
		if !self.persist {
			writeln!(out, "Session persistence is disabled")?;
		}
		Ok(())
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearOutput {
	pub location: String,
	pub removed: bool,
}

pub fn clear(ctx: &InvocationContext) -> Result<ClearOutput> {
	let config = ctx.config();
	Ok(ClearOutput {
		location: ctx.cache().location(config),
		removed: ctx.cache().clear(config)?,
	})
}

impl TextOutput for ClearOutput {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		if self.removed {
			writeln!(out, "Removed {}", self.location)
		} else {
			writeln!(out, "Nothing cached at {}", self.location)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FakeServer, config, invocation};

	fn text(output: &impl TextOutput) -> String {
		let mut out = Vec::new();
		output.write_text(&mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[tokio::test]
	async fn login_reports_strategy_and_cache() {
		let server = FakeServer::new("6.0");
		server.add_user("root", "vmware");
		let ctx = invocation(&server, config("root:vmware@esx", &[]), Default::default());

		let output = login(&ctx).await.unwrap();
		assert_eq!(output.source, SessionSource::Login(AuthSource::Password));
		assert_eq!(output.user_name.as_deref(), Some("root"));
		assert!(text(&output).starts_with("Logged in as root via password (API version 6.0)\nSession cached at memory:"));
		assert!(status(&ctx).unwrap().exists);
	}

	#[tokio::test]
	async fn logout_then_clear() {
		let server = FakeServer::new("6.0");
		server.add_user("root", "vmware");
		let ctx = invocation(&server, config("root:vmware@esx", &[]), Default::default());
		login(&ctx).await.unwrap();

		let output = logout(&ctx).await.unwrap();
		assert!(output.ended);
		assert_eq!(server.active_sessions(), 0);
		assert!(!status(&ctx).unwrap().exists);

		let cleared = clear(&ctx).unwrap();
		assert!(!cleared.removed);
		assert!(text(&cleared).starts_with("Nothing cached at "));
	}

	#[tokio::test]
	async fn status_without_persistence() {
		let server = FakeServer::new("6.0");
		let ctx = invocation(&server, config("esx", &[("VMCTL_PERSIST_SESSION", "0")]), Default::default());

		let status = status(&ctx).unwrap();
		assert!(!status.exists && !status.persist);
		assert!(text(&status).ends_with("(absent)\nSession persistence is disabled\n"));
		assert!(server.calls().is_empty());
	}
}
