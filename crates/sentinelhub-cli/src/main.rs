//! shub - Command-line interface to the Sentinel Hub OGC services
//!
//! This is a thin driver of the core crates: every command loads the persisted
//! settings, performs one action and saves what it changed.

mod cli;
mod commands;
mod context;
mod errors;
mod output;
mod output_types;

use clap::Parser;
use cli::Cli;

fn main() {
    // Logs go to stderr so that JSON output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(error) = commands::execute(cli) {
        errors::from_anyhow(error).display();
        std::process::exit(1);
    }
}
