mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use petal_core::Backoffice;

use crate::cli::{Cli, Command};
use crate::commands::DataCommand;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
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
    let data_cmd = match cli.command {
        // Config commands don't need a backend connection
        Command::Config(args) => return commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "petal", &mut std::io::stdout());
            return Ok(());
        }

        Command::Customers(args) => DataCommand::Customers(args),
        Command::Products(args) => DataCommand::Products(args),
        Command::Orders(args) => DataCommand::Orders(args),
        Command::Inventory(args) => DataCommand::Inventory(args),
    };

    let backend = config::build_backend_config(&cli.global)?;
    let backoffice = Backoffice::new(backend)?;

    tracing::debug!(command = ?data_cmd, "dispatching command");
    commands::dispatch(data_cmd, &backoffice, &cli.global).await
}
