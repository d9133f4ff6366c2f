//! Command line argument parsing for the docclass CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::Algorithm;

/// docclass - train and query per-user document classifiers
#[derive(Parser, Debug, Clone)]
#[command(name = "docclass")]
#[command(about = "Train and query per-user document classifiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct DocclassArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl DocclassArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train one item under a category
    Train(TrainArgs),

    /// Train every item of a JSON Lines file
    #[command(name = "train-batch")]
    TrainBatch(TrainBatchArgs),

    /// Classify an item
    Classify(ClassifyArgs),

    /// Rank features by accumulated liking
    Ranking(RankingArgs),

    /// Show count statistics for a user
    Stats(StatsArgs),
}

/// Store location and owner shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// Directory holding the count snapshots
    #[arg(value_name = "STORE_DIR")]
    pub store_dir: PathBuf,

    /// Owner of the counts
    #[arg(short, long, env = "DOCCLASS_USER")]
    pub user: String,

    /// Fsync snapshots on commit
    #[arg(long)]
    pub sync: bool,
}

/// Arguments for training one item
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Category to train the item under
    #[arg(short, long)]
    pub category: String,

    /// Item text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Classifier configuration file (JSON); only the extractor is used
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for batch training
#[derive(Parser, Debug, Clone)]
pub struct TrainBatchArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// JSON Lines file of `{"item": ..., "category": ...}` records
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Classifier configuration file (JSON); only the extractor is used
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Skip malformed lines instead of failing
    #[arg(long)]
    pub skip_invalid: bool,
}

/// Arguments for classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Item text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Category returned when no category is accepted
    #[arg(short, long, default_value = "unknown")]
    pub default: String,

    /// Algorithm (overrides the configuration file)
    #[arg(short, long)]
    pub algorithm: Option<Algorithm>,

    /// Classifier configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Include the score of every category
    #[arg(long)]
    pub scores: bool,
}

/// Arguments for the liking ranking
#[derive(Parser, Debug, Clone)]
pub struct RankingArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Maximum number of features to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for count statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
