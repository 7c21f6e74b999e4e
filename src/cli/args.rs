//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// freewatch - watch classified listings for things worth grabbing
///
/// Polls listing pages, remembers which postings were already reported,
/// and records new keyword matches.
#[derive(Parser, Debug)]
#[command(name = "freewatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FREEWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for persisted caches and the notification log
    #[arg(long, global = true, env = "FREEWATCH_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll all sources until interrupted
    Run(RunArgs),

    /// Check a title against the keyword set
    Match(MatchArgs),

    /// Inspect or clear persisted dedup caches
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Poll every source once and exit
    #[arg(long, conflicts_with = "cycles")]
    pub once: bool,

    /// Stop after N cycles
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Only poll the named sources (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub source: Vec<String>,
}

impl RunArgs {
    /// Cycle limit implied by the flags
    pub fn max_cycles(&self) -> Option<u64> {
        if self.once {
            Some(1)
        } else {
            self.cycles
        }
    }
}

/// Arguments for the match command
#[derive(Parser, Debug)]
pub struct MatchArgs {
    /// Listing title to test
    pub title: String,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List persisted caches
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one source's cache, most recent first
    Show {
        /// Source name
        source: String,

        /// Maximum identifiers to print (0 = all)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Delete persisted caches
    Clear {
        /// Source to clear (all sources when omitted)
        source: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
