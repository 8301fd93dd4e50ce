//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// polyconf - Resolve layered application configuration
#[derive(Parser, Debug)]
#[command(name = "polyconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve configuration and print the result
    ///
    /// Examples:
    ///   polyconf resolve -n widget                  # All sources
    ///   polyconf resolve -n widget -p file -p env   # Only file and env
    ///   polyconf resolve --set db.port=5433 -o raw  # Override and show provenance
    Resolve {
        #[command(flatten)]
        source: SourceArgs,

        /// Result view to print
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Primitive)]
        output: OutputFormat,
    },

    /// List plugins in execution order
    List,

    /// Show which layer supplied the value(s) under a key path
    Explain {
        /// Dotted key path, e.g. `db.host`
        path: String,

        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Options shared by every command that runs a resolution
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SourceArgs {
    /// Application name, used to find configuration files
    #[arg(short = 'n', long, default_value = "widget")]
    pub app_name: String,

    /// Environment variable prefix (default: upper-cased app name)
    #[arg(long)]
    pub app_prefix: Option<String>,

    /// Plugins to run (repeatable, `ALL` for every plugin)
    #[arg(short = 'p', long = "select-plugin")]
    pub select_plugin: Vec<String>,

    /// Explicit override, `key.path=value` (value parsed as JSON if possible)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Settings file (TOML)
    #[arg(long, env = "POLYCONF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Per-plugin timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Result view printed by `resolve`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Merged tree as JSON, in insertion order
    Primitive,
    /// Canonical sorted-key JSON
    Serialized,
    /// Per-key values with source and rank, plus layer outcomes
    Raw,
}
