//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

/// Render an organizational hierarchy from flat parent/child records as a collapsible tree
#[derive(Parser, Debug)]
#[command(name = "orgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug logging (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (layered over the global config)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where records come from and how to unwrap them.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// JSON file with records, "-" for stdin (default: demo data)
    #[arg(value_hint = ValueHint::FilePath)]
    pub source: Option<PathBuf>,

    /// Field holding the records in a wrapper object (overrides config)
    #[arg(short, long)]
    pub field: Option<String>,

    /// Do not unwrap a wrapper object
    #[arg(long, conflicts_with = "field")]
    pub raw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Connector guides with expand/collapse markers
    #[default]
    Tree,
    /// Fully expanded plain tree
    Plain,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the hierarchy
    Show {
        #[command(flatten)]
        source: SourceArgs,
        /// Collapse these node ids before rendering
        #[arg(short, long, value_delimiter = ',')]
        collapse: Vec<i64>,
        /// Use ASCII connectors
        #[arg(long)]
        ascii: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
        /// Maximum rendered levels (overrides config)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Expand and collapse nodes interactively (commands on stdin)
    Browse {
        #[command(flatten)]
        source: SourceArgs,
        /// Use ASCII connectors
        #[arg(long)]
        ascii: bool,
    },

    /// Report structural issues in the records
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the demo records as JSON
    Demo,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Init,

    /// Show config paths
    Path,
}
