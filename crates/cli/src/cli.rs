use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Args, Parser, Subcommand};

use crate::config::ConnectionOverrides;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "vmctl")]
#[command(about = "Command-line client for remote virtualization management")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default) or json
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	#[command(flatten)]
	pub connection: ConnectionArgs,

	#[command(subcommand)]
	pub command: Commands,
}

/// Connection flags; each falls back to its `VMCTL_*` variable.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
	/// Endpoint URL, e.g. `user:pass@host` [VMCTL_URL]
	#[arg(short = 'u', long, global = true, value_name = "URL")]
	pub url: Option<String>,

	/// User name, replaces the one in the URL [VMCTL_USERNAME]
	#[arg(long, global = true)]
	pub username: Option<String>,

	/// Password, replaces the one in the URL [VMCTL_PASSWORD]
	#[arg(long, global = true)]
	pub password: Option<String>,

	/// Client certificate for extension login [VMCTL_CERTIFICATE]
	#[arg(long, global = true, value_name = "FILE")]
	pub cert: Option<PathBuf>,

	/// Private key for the certificate [VMCTL_PRIVATE_KEY]
	#[arg(long, global = true, value_name = "FILE")]
	pub key: Option<PathBuf>,

	/// Skip server certificate verification [VMCTL_INSECURE]
	#[arg(short = 'k', long, global = true, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub insecure: Option<String>,

	/// Reuse the session across invocations [VMCTL_PERSIST_SESSION]
	#[arg(long, global = true, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub persist_session: Option<String>,

	/// Minimum API version, `-` disables the check [VMCTL_MIN_API_VERSION]
	#[arg(long, global = true, value_name = "VERSION")]
	pub min_api_version: Option<String>,

	/// RPC namespace [VMCTL_RPC_NAMESPACE]
	#[arg(long, global = true)]
	pub rpc_namespace: Option<String>,

	/// RPC version [VMCTL_RPC_VERSION]
	#[arg(long, global = true)]
	pub rpc_version: Option<String>,

	/// Inventory folder [VMCTL_FOLDER]
	#[arg(long, global = true, value_name = "PATH")]
	pub folder: Option<String>,

	/// Datastore name [VMCTL_DATASTORE]
	#[arg(long = "ds", global = true, value_name = "NAME")]
	pub datastore: Option<String>,
}

impl ConnectionArgs {
	pub fn overrides(&self) -> ConnectionOverrides {
		ConnectionOverrides {
			url: self.url.clone(),
			username: self.username.clone(),
			password: self.password.clone(),
			certificate: self.cert.clone(),
			private_key: self.key.clone(),
			insecure: self.insecure.clone(),
			persist_session: self.persist_session.clone(),
			min_api_version: self.min_api_version.clone(),
			namespace: self.rpc_namespace.clone(),
			version: self.rpc_version.clone(),
			folder: self.folder.clone(),
			datastore: self.datastore.clone(),
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Show product and API information of the endpoint
	About,

	/// Print the connection as VMCTL_* environment variables
	Env {
		/// Also print the URL's scheme, host, port, path, fragment and query
		#[arg(short = 'x')]
		extra: bool,
	},

	/// Manage the cached session
	#[command(subcommand)]
	Session(SessionCommand),

	/// Inventory folder operations
	#[command(subcommand)]
	Folder(FolderCommand),

	/// Datastore operations
	#[command(subcommand)]
	Datastore(DatastoreCommand),
}

impl Commands {
	/// Command name used in result envelopes.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::About => "about",
			Commands::Env { .. } => "env",
			Commands::Session(SessionCommand::Login) => "session login",
			Commands::Session(SessionCommand::Logout) => "session logout",
			Commands::Session(SessionCommand::Status) => "session status",
			Commands::Session(SessionCommand::Clear) => "session clear",
			Commands::Folder(FolderCommand::Info) => "folder info",
			Commands::Datastore(DatastoreCommand::Ls(_)) => "datastore ls",
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
	/// Establish (or reuse) a session
	Login,
	/// End the cached session and remove it
	Logout,
	/// Show where the session is cached
	Status,
	/// Remove the cached session without contacting the endpoint
	Clear,
}

#[derive(Subcommand, Debug)]
pub enum FolderCommand {
	/// Show the selected folder (root when none is set)
	Info,
}

#[derive(Subcommand, Debug)]
pub enum DatastoreCommand {
	/// List files on the datastore
	Ls(LsArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct LsArgs {
	/// Long listing format
	#[arg(short = 'l')]
	pub long: bool,

	/// Write a slash after each folder name
	#[arg(short = 'p')]
	pub slash: bool,

	/// Include entries whose names begin with a dot
	#[arg(short = 'a')]
	pub all: bool,

	/// Paths relative to the datastore root
	#[arg(value_name = "FILE")]
	pub files: Vec<String>,
}

/// Help colors in cargo's style: green bold headers, cyan literals.
pub fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn command_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn connection_flags_become_overrides() {
		let cli = Cli::try_parse_from(["vmctl", "-k", "--url", "root@esx", "--ds", "ds1", "about"]).unwrap();
		let overrides = cli.connection.overrides();
		assert_eq!(overrides.url.as_deref(), Some("root@esx"));
		assert_eq!(overrides.insecure.as_deref(), Some("true"));
		assert_eq!(overrides.datastore.as_deref(), Some("ds1"));
		assert!(overrides.persist_session.is_none());
	}

	#[test]
	fn global_flags_after_subcommand() {
		let cli = Cli::try_parse_from(["vmctl", "datastore", "ls", "-l", "-p", "vm", "--ds", "ds1", "-f", "json"]).unwrap();
		assert_eq!(cli.format, OutputFormat::Json);
		let Commands::Datastore(DatastoreCommand::Ls(args)) = cli.command else {
			panic!("expected datastore ls");
		};
		assert!(args.long && args.slash && !args.all);
		assert_eq!(args.files, vec!["vm"]);
	}

	#[test]
	fn persist_flag_accepts_explicit_value() {
		let cli = Cli::try_parse_from(["vmctl", "--persist-session=false", "session", "login"]).unwrap();
		assert_eq!(cli.connection.persist_session.as_deref(), Some("false"));

		let cli = Cli::try_parse_from(["vmctl", "-k", "about"]).unwrap();
		assert_eq!(cli.connection.insecure.as_deref(), Some("true"));
		assert!(matches!(cli.command, Commands::About));
	}
}
