use clap::Parser;
use iqp_cli::cli::Cli;
use iqp_cli::context::{CommandContext, resolve_config};
use iqp_cli::{commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let result = match resolve_config(&cli.global) {
		Ok(config) => match CommandContext::new(config) {
			Ok(ctx) => commands::dispatch(cli.command, &ctx).await,
			Err(err) => Err(err),
		},
		Err(err) => Err(err),
	};

	if let Err(err) = result {
		error!(target: "iqp", error = %err, "command failed");
		std::process::exit(1);
	}
}
