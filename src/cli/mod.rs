pub mod config;
pub mod files;
pub mod init;
pub mod report;
pub mod rules;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::KeyCode;

#[derive(Parser)]
#[command(
    name = "ccc",
    version,
    about = "Classify a credit card statement and report reward-qualifying spend."
)]
pub struct Cli {
    /// Config file (default: ~/.config/ccc/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify the latest statement and print the report (the default).
    Report(ReportArgs),
    /// List statement files in the download directory, oldest first.
    Files {
        /// Directory to search (default: statement.dir from the config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Write the factory configuration file.
    Init {
        /// Overwrite an existing config, keeping a timestamped backup
        #[arg(long)]
        force: bool,
    },
    /// Manage category rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Inspect the configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Default)]
pub struct ReportArgs {
    /// Statement to process instead of the latest matching file
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Directory to search for the latest statement
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Print a JSON summary instead of the text report
    #[arg(long)]
    pub json: bool,
    /// Also write the classified rows to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,
    /// Write the text report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List rules in priority order (last match wins).
    List,
    /// Append a rule; it takes priority over every existing rule.
    Add {
        /// Substring to look for in the item text (case-sensitive)
        pattern: String,
        /// Key code to assign
        #[arg(long)]
        key: KeyCode,
        /// Whether the key earns the reward; required for a key with no qualification entry
        #[arg(long)]
        qualified: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file location.
    Path,
    /// Print the effective configuration.
    Show,
}
