//! Clap derive structures for the `scadapoll` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// scadapoll -- poll and write CompactSCADA items
#[derive(Debug, Parser)]
#[command(
    name = "scadapoll",
    version,
    about = "Poll and write CompactSCADA items from the command line",
    long_about = "Reads items by pattern or by name from a CompactSCADA endpoint,\n\
        keeps an ordered view of them up to date, and writes new values.",
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
    /// Endpoint profile to use
    #[arg(long, short = 'p', env = "SCADAPOLL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Endpoint base URL (overrides profile)
    #[arg(long, short = 'u', env = "SCADAPOLL_URL", global = true)]
    pub url: Option<String>,

    /// Item name pattern (server-side regular expression)
    #[arg(long, short = 'P', global = true, conflicts_with = "item")]
    pub pattern: Option<String>,

    /// Item name; repeat for several items
    #[arg(long = "item", short = 'i', global = true)]
    pub item: Vec<String>,

    /// Poll interval in milliseconds (0 polls once)
    #[arg(long, env = "SCADAPOLL_INTERVAL", global = true)]
    pub interval: Option<u64>,

    /// Log request URLs and bodies
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SCADAPOLL_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SCADAPOLL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SCADAPOLL_TIMEOUT", global = true)]
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
    /// Plain text, one `name=value` per line (scripting)
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll continuously and print items after every tick
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Poll once and print the items
    #[command(alias = "r")]
    Read,

    /// Write one or more item values
    #[command(alias = "s")]
    Set(SetArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH / SET
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many ticks
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Only print ticks that changed something
    #[arg(long)]
    pub changes: bool,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Assignments as NAME=VALUE; values are read as bool, number,
    /// `null`, or text
    #[arg(required = true, value_name = "NAME=VALUE")]
    pub assignments: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (url, pattern, items, interval_ms, debug, timeout,
        /// insecure, ca_cert)
        key: String,

        /// Value to set; for `items` a comma-separated list
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}
