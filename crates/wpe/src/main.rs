mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wpe_api::WpEngineClient;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::Resolved;
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

    // stdout carries command output (and CGI responses); logs go to stderr.
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
        // Config commands never touch the API
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wpe", &mut std::io::stdout());
            Ok(())
        }

        // Credentials are only resolved if the request asks for the listing
        Command::Cgi => {
            commands::cgi::handle(|| connect(&cli.global).map(|(client, _)| client)).await
        }

        cmd => {
            let (client, resolved) = connect(&cli.global)?;
            tracing::debug!(
                command = ?cmd,
                base_url = %client.base_url(),
                "dispatching command"
            );
            commands::dispatch(cmd, &client, &resolved, &cli.global).await
        }
    }
}

/// Load the config file, merge flags, and build the API client.
fn connect(global: &GlobalOpts) -> Result<(WpEngineClient, Resolved), CliError> {
    let cfg = config::load_config_or_default();
    let resolved = config::resolve(global, &cfg)?;
    let client = WpEngineClient::new(resolved.client.clone())?;
    Ok((client, resolved))
}
