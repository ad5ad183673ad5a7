//! Structured output envelope for all CLI commands.
//!
//! In JSON mode every command writes one envelope to stdout:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "ok": true,
//!   "command": "datastore ls",
//!   "data": [ ... ]
//! }
//! ```
//!
//! On failure:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "ok": false,
//!   "command": "about",
//!   "error": {
//!     "code": "VERSION_ERROR",
//!     "message": "Require API version 5.5, connected to API version 5.0 (set VMCTL_MIN_API_VERSION to override)"
//!   }
//! }
//! ```
//!
//! Text mode renders the data through [`TextOutput`] instead.


use std::io::{self, Write};

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON envelope
	Json,
}

impl std::str::FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"text" => Ok(OutputFormat::Text),
			"json" => Ok(OutputFormat::Json),
			_ => Err(format!("unknown format: {s}")),
		}
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Text => write!(f, "text"),
			OutputFormat::Json => write!(f, "json"),
		}
	}
}

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,

	pub ok: bool,

	/// Command name (e.g., "about", "session login")
	pub command: String,

	/// Command-specific result data (only present on success)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	/// Error information (only present on failure)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
}

/// Error information for failed commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	/// Human-readable error message
	pub message: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Missing or malformed connection settings
	InvalidConfig,
	/// Certificate or key could not be loaded
	CredentialError,
	/// Login rejected or local ticket unusable
	AuthError,
	/// Session cache unreadable or failed validation
	CacheError,
	/// Remote API older than the configured minimum
	VersionError,
	/// Transport failure after retries
	NetworkError,
	/// Structured fault from the remote service
	RemoteFault,
	/// Requested inventory object or file does not exist
	NotFound,
	/// Session could not be established
	SessionError,
	/// File I/O error
	IoError,
	/// Unknown/internal error
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			ErrorCode::InvalidConfig => "INVALID_CONFIG",
			ErrorCode::CredentialError => "CREDENTIAL_ERROR",
			ErrorCode::AuthError => "AUTH_ERROR",
			ErrorCode::CacheError => "CACHE_ERROR",
			ErrorCode::VersionError => "VERSION_ERROR",
			ErrorCode::NetworkError => "NETWORK_ERROR",
			ErrorCode::RemoteFault => "REMOTE_FAULT",
			ErrorCode::NotFound => "NOT_FOUND",
			ErrorCode::SessionError => "SESSION_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		};
		f.write_str(name)
	}
}

/// Builder for constructing command results
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: None,
		});
		self
	}

	pub fn command_error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
		}
	}
}

/// Plain-text rendering of command data.
pub trait TextOutput {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Prints successful command data in `format`.
pub fn print_data<T: Serialize + TextOutput>(command: &str, data: T, format: OutputFormat) {
	match format {
		OutputFormat::Text => {
			let mut stdout = io::stdout().lock();
			let _ = data.write_text(&mut stdout);
		}
		OutputFormat::Json => {
			let result = ResultBuilder::new(command).data(data).build();
			print_result(&result, format);
		}
	}
}

/// Print a command result to stdout in the specified format
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			if let Some(ref data) = result.data {
				if let Ok(json) = serde_json::to_string_pretty(data) {
					println!("{json}");
				}
			} else if let Some(ref error) = result.error {
				println!("Error [{}]: {}", error.code, error.message);
			}
		}
	}
}

/// Print an error to stderr in human-readable format
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("{} [{}]: {}", "Error".red().bold(), error.code, error.message);
}
