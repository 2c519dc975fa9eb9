//! Clap derive structures for the `netdash` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use netdash_core::StatusFilter;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netdash -- one view over every network inventory backend
#[derive(Debug, Parser)]
#[command(
    name = "netdash",
    version,
    about = "Inspect network inventories from the command line",
    long_about = "Reads devices, sites, interfaces, alerts, and topology from an inventory\n\
        backend and renders them in one canonical schema, whichever field casing\n\
        and status vocabulary the backend uses.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "NETDASH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "NETDASH_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Backend convention: snake or camel (overrides profile)
    #[arg(long, env = "NETDASH_CONVENTION", global = true)]
    pub convention: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETDASH_OUTPUT",
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
    #[arg(long, short = 'k', env = "NETDASH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "NETDASH_TIMEOUT", global = true)]
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
    /// Plain text, one value per line (scripting)
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
    /// List and manage devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List and manage sites
    Sites(SitesArgs),

    /// Show one site with its devices grouped by type
    Site {
        /// Site ID
        id: String,
    },

    /// Device health and alert counts
    #[command(alias = "stats")]
    Summary(SummaryArgs),

    /// Interface summary and table for one device
    #[command(alias = "if")]
    Interfaces {
        /// Device ID
        device: String,
    },

    /// Device adjacency graph, including unknown neighbors
    #[command(alias = "topo")]
    Topology,

    /// List alerts, optionally for one device
    Alerts(AlertsArgs),

    /// Query the backend's health endpoint
    Health,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: Option<DevicesCommand>,

    #[command(flatten)]
    pub list: DeviceListArgs,
}

#[derive(Debug, Default, Args)]
pub struct DeviceListArgs {
    /// Status facet: all, online, offline, warning, mac-change
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: StatusFilter,

    /// Case-insensitive match on hostname, IP address, or device type
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// JSON file with recorded MAC changes (for --filter mac-change)
    #[arg(long, value_name = "FILE")]
    pub mac_changes: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// Show device details
    Get {
        /// Device ID
        id: String,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SITES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: Option<SitesCommand>,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// Create a site
    Create {
        /// Site name (at least two characters)
        #[arg(long)]
        name: String,

        /// Free-form location
        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a site
    #[command(alias = "rm")]
    Delete {
        /// Site ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SUMMARY / ALERTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// JSON file with recorded MAC changes
    #[arg(long, value_name = "FILE")]
    pub mac_changes: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AlertsArgs {
    /// Only alerts raised for this device
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Hide resolved alerts
    #[arg(long)]
    pub active: bool,
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
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Add or replace a backend profile
    AddProfile {
        /// Profile name
        name: String,

        /// Backend URL
        #[arg(long)]
        url: String,

        /// snake or camel
        #[arg(long, default_value = "snake")]
        convention: String,

        /// Background refresh interval in seconds
        #[arg(long, default_value = "0")]
        refresh_interval: u64,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },
}
