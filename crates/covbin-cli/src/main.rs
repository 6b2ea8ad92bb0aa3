//! covbin CLI: inspect and merge functional coverage databases
//!
//! ## Usage
//!
//! ```bash
//! covbin summary alu.cov              # Coverage summary
//! covbin summary alu.cov --check      # Fail when holes remain
//! covbin holes alu.cov --target 90    # Bins below 90%
//! covbin merge a.cov b.cov -o all.cov # Merge regression runs
//! ```

use clap::Parser;
use covbin_cli::{
    handlers::{execute_bins, execute_holes, execute_merge, execute_summary},
    Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    match cli.command {
        Commands::Summary(args) => execute_summary(&config, &args),
        Commands::Holes(args) => execute_holes(&config, &args),
        Commands::Bins(args) => execute_bins(&config, &args),
        Commands::Merge(args) => execute_merge(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

/// Log to stderr so stdout stays clean for reports and JSON
fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()));

    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.color.should_color())
        .init();
}
