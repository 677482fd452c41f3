//! Binary crate for the `air` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive prompts (token input, station menus)
//! - Human-friendly table output

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod prompt;
mod table;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

/// Logs go to stderr so they never interleave with table output.
///
/// `RUST_LOG` wins over the default filter (e.g. `RUST_LOG=aqi_core=trace`).
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "air=debug,aqi_core=debug"
    } else {
        "air=warn,aqi_core=warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
