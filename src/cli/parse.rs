//! CLI parse: clap types for Syllabus. No behavior; definitions only.

use crate::config::SchemeKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Syllabus CLI - content-addressed course publishing
#[derive(Parser)]
#[command(name = "syllabus")]
#[command(about = "Publish hashed course content and keep client caches in sync")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the source tree and publish descriptors plus the version manifest
    Build {
        /// Source root (overrides build.source_root)
        #[arg(long)]
        source: Option<PathBuf>,
        /// Publish root (overrides build.publish_root)
        #[arg(long)]
        publish: Option<PathBuf>,
    },
    /// Print the aggregated hash tree of one directory
    Hash {
        /// Directory to aggregate
        dir: PathBuf,
        /// Maximum depth shown (0 = root only)
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Synchronize the local cache against a published site
    Sync {
        /// Site base URL (overrides client.base_url)
        #[arg(long)]
        base_url: Option<String>,
        /// Descriptor addressing scheme (overrides client.scheme)
        #[arg(long, value_enum)]
        scheme: Option<SchemeArg>,
        /// Use an in-memory cache instead of the persistent one
        #[arg(long)]
        ephemeral: bool,
    },
    /// Manage the local client cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// Inspect the resolved configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove every cached manifest and descriptor
    Clear,
    /// Show the cached manifest
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    Flat,
    Nested,
}

impl From<SchemeArg> for SchemeKind {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Flat => SchemeKind::Flat,
            SchemeArg::Nested => SchemeKind::Nested,
        }
    }
}

impl Commands {
    /// Stable command name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Build { .. } => "build",
            Commands::Hash { .. } => "hash",
            Commands::Sync { .. } => "sync",
            Commands::Cache {
                command: CacheCommands::Clear,
            } => "cache clear",
            Commands::Cache {
                command: CacheCommands::Show,
            } => "cache show",
            Commands::Config { .. } => "config show",
        }
    }
}
