//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Aggregate multiplex partitions and rebuild a significance-annotated tree
///
/// The first partition file is the core partition: it defines the node set
/// and supplies rank, flow and name for every node. Reordering the files
/// changes the result.
#[derive(Parser, Debug)]
#[command(name = "sigtree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Aggregated partition file (written, then handed to the validator)
    #[arg(
        value_hint = ValueHint::FilePath,
        required_unless_present_any = ["generator", "print_config"]
    )]
    pub agg_file: Option<PathBuf>,

    /// Output tree file
    #[arg(
        value_hint = ValueHint::FilePath,
        required_unless_present_any = ["generator", "print_config"]
    )]
    pub tree_file: Option<PathBuf>,

    /// Input partition files, first one is the core partition
    #[arg(
        value_hint = ValueHint::FilePath,
        num_args = 1..,
        required_unless_present_any = ["generator", "print_config"]
    )]
    pub filenames: Vec<PathBuf>,

    /// Significance clustering executable
    #[arg(long, value_hint = ValueHint::ExecutablePath)]
    pub validator: Option<PathBuf>,

    /// Seconds before the validator is killed (0 disables the timeout)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Result file (default: agg_file with the result suffix before its extension)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub result_file: Option<PathBuf>,

    /// Do not run the validator, reuse an existing result file
    #[arg(long, conflicts_with = "aggregate_only")]
    pub skip_validator: bool,

    /// Stop after writing the aggregated partition file
    #[arg(long)]
    pub aggregate_only: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,

    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Generate shell completions
    #[arg(long = "generate", value_enum)]
    pub generator: Option<clap_complete::Shell>,
}
