//! Minimum API version check.

use tracing::debug;
use vmctl::{Client, Version};

use crate::config::VERSION_CHECK_DISABLED;
use crate::error::{Result, VmctlError};

/// API versions ending in this suffix are development builds and skip the check.
pub const DEVELOPMENT_BUILD_SUFFIX: &str = ".x";

/// Fails unless `remote` is at least `minimum`.
pub fn check(remote: &str, minimum: &str) -> Result<()> {
	if minimum == VERSION_CHECK_DISABLED {
		return Ok(());
	}
	if remote.ends_with(DEVELOPMENT_BUILD_SUFFIX) {
		debug!(target = "vmctl.broker", remote, "skipping version check for development build");
		return Ok(());
	}

	let actual: Version = remote
		.parse()
		.map_err(|err| VmctlError::Version(format!("remote API version: {err}")))?;
	let required: Version = minimum
		.parse()
		.map_err(|err| VmctlError::Version(format!("minimum API version: {err}")))?;
	if !required.lte(&actual) {
		return Err(VmctlError::version_too_old(minimum, remote));
	}
	Ok(())
}

/// Checks the API version `client` advertised.
pub fn check_client(client: &Client, minimum: &str) -> Result<()> {
	check(&client.about().api_version, minimum)
}
