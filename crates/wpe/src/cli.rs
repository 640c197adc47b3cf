//! Clap derive structures for the `wpe` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs` for man page generation, so this file may
//! only depend on clap and clap_complete.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wpe -- WP Engine sites, installs, backups and cache purges
#[derive(Debug, Parser)]
#[command(
    name = "wpe",
    version,
    about = "Manage WP Engine installs from the command line",
    long_about = "A CLI for the WP Engine hosting API.\n\n\
        Lists sites and their installs, requests backups and purges caches.\n\
        Run `wpe cgi` behind a web server to serve the site listing as JSON.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "WPE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API user id (overrides profile)
    #[arg(long, short = 'u', env = "WPENGINE_USER_ID", global = true)]
    pub user: Option<String>,

    /// API password (overrides profile and keyring)
    #[arg(long, env = "WPENGINE_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "WPE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "WPE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds [default: from config, else 30]
    #[arg(long, env = "WPE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sites and their installs
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Request a backup of an install
    #[command(alias = "b")]
    Backup(BackupArgs),

    /// Purge an install's object and/or page cache
    Purge(PurgeArgs),

    /// Send a raw request to the API
    Api(ApiArgs),

    /// Serve the site listing as a CGI program
    Cgi,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List every site with its installs
    #[command(alias = "ls")]
    List(SitesListArgs),
}

#[derive(Debug, Args)]
pub struct SitesListArgs {
    /// Only show installs in this environment (production, staging, development)
    #[arg(long, short = 'e')]
    pub environment: Option<String>,

    /// Only show sites whose name contains this text
    #[arg(long, short = 'f')]
    pub filter: Option<String>,
}

// ── Backup ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Install id
    pub install_id: String,

    /// Backup description
    #[arg(long, short = 'd', default_value = "quick backup")]
    pub description: String,

    /// Address(es) to notify when the backup completes [default: from config]
    #[arg(long, short = 'n')]
    pub notify: Option<String>,
}

// ── Purge ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Install id
    pub install_id: String,

    /// Which cache layer to purge
    #[arg(long, short = 't', value_enum, default_value = "all")]
    pub r#type: PurgeTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PurgeTarget {
    /// Object cache only
    Object,
    /// Page cache only
    Page,
    /// Object cache, then page cache
    All,
}

// ── Raw API ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Endpoint relative to the API root (e.g. `sites`, `installs/{id}`)
    pub endpoint: String,

    /// HTTP method
    #[arg(long, short = 'X', value_enum, default_value = "get")]
    pub method: HttpMethod,

    /// Request argument as key=value (query param for GET, JSON field otherwise)
    #[arg(long = "field", short = 'F', value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactively create or update a profile
    Init,
    /// Show the current configuration (secrets masked)
    Show,
    /// Print the config file path
    Path,
    /// Store a profile's API password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
