//! Command dispatch: bridges CLI args -> client calls -> output formatting.

pub mod api;
pub mod backup;
pub mod cgi;
pub mod config_cmd;
pub mod purge;
pub mod sites;
pub mod util;

use wpe_api::WpEngineClient;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &WpEngineClient,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites(args) => sites::handle(client, args, resolved, global).await,
        Command::Backup(args) => backup::handle(client, args, resolved, global).await,
        Command::Purge(args) => purge::handle(client, args, resolved, global).await,
        Command::Api(args) => api::handle(client, args, resolved, global).await,
        // Cgi, Config and Completions are handled before dispatch
        Command::Cgi | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
