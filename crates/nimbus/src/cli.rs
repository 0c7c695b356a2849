//! Clap derive structures for the `nimbus` CLI.
//!
//! Resource commands take the kind as their first positional argument
//! (`nimbus list firewall`), so the tree stays the same size no matter how
//! many collections the console exposes.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nimbus_core::ResourceKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nimbus -- manage a cloud console from the command line
#[derive(Debug, Parser)]
#[command(
    name = "nimbus",
    version,
    about = "Manage Nimbus cloud consoles from the command line",
    long_about = "List, inspect and modify every collection of a Nimbus cloud console:\n\
        nodes, zones, instances, pods, firewalls, balancers and more.",
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
    /// Console profile to use
    #[arg(long, short = 'p', env = "NIMBUS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Console URL (overrides profile)
    #[arg(long, short = 'u', env = "NIMBUS_URL", global = true)]
    pub url: Option<String>,

    /// Organization id to scope requests to
    #[arg(long, env = "NIMBUS_ORGANIZATION", global = true)]
    pub organization: Option<String>,

    /// Session cookie of a logged-in administrator
    #[arg(long, env = "NIMBUS_SESSION", global = true, hide_env = true)]
    pub session: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NIMBUS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NIMBUS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NIMBUS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Resolve a kind name (`firewall`, `Firewall`).
fn parse_kind(raw: &str) -> Result<ResourceKind, String> {
    raw.parse().map_err(|_| {
        format!("unknown resource kind '{raw}' (run `nimbus kinds` for the full list)")
    })
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one page of a collection
    #[command(alias = "ls")]
    List(ListArgs),

    /// List record names, optionally scoped (e.g. nodes of a zone)
    Names(NamesArgs),

    /// Show one record
    Get(TargetArgs),

    /// Create a record from a JSON file
    Create(CreateArgs),

    /// Merge fields from a JSON file into a record and save it
    Update(UpdateArgs),

    /// Delete one record
    #[command(alias = "rm")]
    Delete(TargetArgs),

    /// Delete several records at once
    DeleteMany(DeleteManyArgs),

    /// Apply a state action (start, stop, ...) to several records
    Action(ActionArgs),

    /// Run a named operation on one record
    #[command(alias = "op")]
    Operation(OperationArgs),

    /// Re-render a collection whenever the console reports a change
    Watch(WatchArgs),

    /// View and edit console settings
    Settings(SettingsArgs),

    /// View and manage the license subscription
    #[command(alias = "sub")]
    Subscription(SubscriptionArgs),

    /// List every resource kind
    Kinds,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Resource Arguments ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Page to fetch (0-based)
    #[arg(long, default_value = "0")]
    pub page: u64,

    /// Filter as key=value; a bare word filters by name
    #[arg(long, short = 'f')]
    pub filter: Vec<String>,
}

#[derive(Debug, Args)]
pub struct NamesArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Restrict the listing, e.g. `zone=<id>`
    #[arg(long, short = 's', value_name = "KEY=VALUE")]
    pub scope: Option<String>,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Record id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// JSON file holding the new record
    #[arg(long, short = 'F')]
    pub from_file: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Record id
    pub id: String,

    /// JSON object whose top-level fields replace the record's
    #[arg(long, short = 'F')]
    pub from_file: PathBuf,
}

#[derive(Debug, Args)]
pub struct DeleteManyArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Record ids
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Bypass delete protection
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ActionArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Action name (start, stop, restart, ...)
    pub action: String,

    /// Record ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct OperationArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Record id
    pub id: String,

    /// Operation name (e.g. `drain` for a node)
    pub op: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Resource kind
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Filter as key=value; a bare word filters by name
    #[arg(long, short = 'f')]
    pub filter: Vec<String>,
}

// ── Documents ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the console settings
    Get,

    /// Merge fields from a JSON file into the settings and save them
    Set {
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct SubscriptionArgs {
    #[command(subcommand)]
    pub command: SubscriptionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubscriptionCommand {
    /// Show the current subscription
    Get,

    /// Re-check the license with the licensing service
    Update,

    /// Activate a license key
    Activate {
        /// License key
        license: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Show the configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Set a profile field
    Set {
        /// Field name (url, organization, session_env, insecure, timeout, page_count, ca_cert)
        key: String,
        /// New value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a session cookie in the system keyring
    SetSession {
        /// Profile to update (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Remove a stored session cookie from the keyring
    Logout {
        /// Profile to update (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
