mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scadapoll_core::Client;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `--debug` raises the floor to `info` so request URLs and bodies show.
fn init_tracing(verbosity: u8, debug: bool) {
    let filter = match (verbosity, debug) {
        (0, false) => "warn",
        (0 | 1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need an endpoint
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        cmd => {
            // Writes need no selector of their own; the assigned names do.
            let fallback = match &cmd {
                Command::Set(args) => args
                    .assignments
                    .iter()
                    .filter_map(|a| a.split('=').next())
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect(),
                _ => Vec::new(),
            };
            let client_config = config::build_client_config(&cli.global, fallback)?;
            let client = Client::new(client_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &client, &cli.global).await
        }
    }
}
