//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// covbin: inspect and merge functional coverage databases
#[derive(Parser, Debug)]
#[command(name = "covbin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a coverage summary for a database
    Summary(SummaryArgs),

    /// List count bins below the target
    Holes(HolesArgs),

    /// List every bin in a database
    Bins(BinsArgs),

    /// Merge databases into one
    ///
    /// The first database supplies name and settings; bins of later
    /// databases add their counts to identical bins or are appended.
    Merge(MergeArgs),
}

/// Arguments for the summary command
#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Coverage database
    pub database: PathBuf,

    /// Target percentage (defaults to the model's own target)
    #[arg(short, long)]
    pub target: Option<f64>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with failure when any count bin is below the target
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the holes command
#[derive(Parser, Debug)]
pub struct HolesArgs {
    /// Coverage database
    pub database: PathBuf,

    /// Target percentage (defaults to the model's own target)
    #[arg(short, long)]
    pub target: Option<f64>,
}

/// Arguments for the bins command
#[derive(Parser, Debug)]
pub struct BinsArgs {
    /// Coverage database
    pub database: PathBuf,
}

/// Arguments for the merge command
#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Databases to merge, in order
    #[arg(required = true, num_args = 1..)]
    pub databases: Vec<PathBuf>,

    /// Output database
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Color choice argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
