use clap::Parser;
use vmctl_cli::{
	cli::Cli,
	commands,
	error::VmctlError,
	logging,
	output::{self, OutputFormat, ResultBuilder},
};

fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = cli.command.name();

	let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
		Ok(runtime) => runtime,
		Err(err) => {
			handle_error(VmctlError::Io(err), command, format);
			std::process::exit(1);
		}
	};

	if let Err(err) = runtime.block_on(commands::dispatch(cli)) {
		handle_error(err, command, format);
		std::process::exit(1);
	}
}

fn handle_error(err: VmctlError, command: &str, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	// Humans always get stderr
	output::print_error_stderr(&cmd_error);

	// Scripts also get the envelope on stdout
	if format != OutputFormat::Text {
		let result: output::CommandResult<()> = ResultBuilder::new(command).command_error(cmd_error).build();
		output::print_result(&result, format);
	}
}
