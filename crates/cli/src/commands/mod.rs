//! Command implementations.
//!
//! Each command returns its data; [`dispatch`] prints it in the selected
//! format and ends the session afterwards.

mod about;
mod datastore;
mod env;
mod folder;
mod session;

use std::sync::Arc;

use tracing::warn;
use vmctl::runtime::HttpConnector;

use crate::cache::FileSessionStore;
use crate::cli::{Cli, Commands, DatastoreCommand, FolderCommand, SessionCommand};
use crate::config::{ConnectionConfig, InventorySelection, ProcessEnviron};
use crate::context::InvocationContext;
use crate::error::Result;
use crate::output::{OutputFormat, print_data};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	let overrides = cli.connection.overrides();
	let config = ConnectionConfig::resolve(&overrides, &ProcessEnviron)?;

	// env only renders the configuration
	if let Commands::Env { extra } = cli.command {
		print_data(cli.command.name(), env::execute(&config, extra), format);
		return Ok(());
	}

	let inventory = InventorySelection::resolve(&overrides, &ProcessEnviron);
	let store = Arc::new(FileSessionStore::in_home()?);
	let ctx = InvocationContext::new(config, inventory, Arc::new(HttpConnector), store);

	let result = run(&ctx, cli.command, format).await;
	let logout = ctx.logout().await;
	match (result, logout) {
		(Err(err), Err(logout_err)) => {
			warn!(target = "vmctl.session", error = %logout_err, "logout failed");
			Err(err)
		}
		(result, logout) => result.and(logout),
	}
}

async fn run(ctx: &InvocationContext, command: Commands, format: OutputFormat) -> Result<()> {
	let name = command.name();
	match command {
		Commands::About => print_data(name, about::execute(ctx).await?, format),
		Commands::Env { extra } => print_data(name, env::execute(ctx.config(), extra), format),
		Commands::Session(SessionCommand::Login) => print_data(name, session::login(ctx).await?, format),
		Commands::Session(SessionCommand::Logout) => print_data(name, session::logout(ctx).await?, format),
		Commands::Session(SessionCommand::Status) => print_data(name, session::status(ctx)?, format),
		Commands::Session(SessionCommand::Clear) => print_data(name, session::clear(ctx)?, format),
		Commands::Folder(FolderCommand::Info) => print_data(name, folder::info(ctx).await?, format),
		Commands::Datastore(DatastoreCommand::Ls(args)) => print_data(name, datastore::ls(ctx, &args).await?, format),
	}
	Ok(())
}
