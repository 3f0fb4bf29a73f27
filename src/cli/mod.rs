pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "protloc",
    version,
    about = "Protein sequence features for subcellular localization",
    long_about = "protloc parses one FASTA file per localization class plus a blind set, \
                  computes composition, physicochemical and dipeptide features, normalizes \
                  them over both populations and reports the resulting matrices."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,

    /// Configuration file (TOML)
    #[arg(short = 'c', long, global = true, env = "PROTLOC_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the handcrafted feature matrices and report their layout
    Features(commands::features::FeaturesArgs),

    /// Encode raw sequences as padded index or one-hot tensors
    Encode(commands::encode::EncodeArgs),

    /// Show statistics about a single FASTA file
    Stats(commands::stats::StatsArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
