//! hvrsync binary entry point.
//!
//! 1. Initializes logging
//! 2. Parses command-line arguments
//! 3. Runs the requested command
//!
//! For library usage, see the hvrsync-sidecar crate documentation.

use anyhow::Result;
use clap::Parser;
use hvrsync_cli::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so command output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("Parsed arguments: {:?}", cli);

    hvrsync_cli::run(&cli)
}
