//! ListSleuth — streaming wordlist search.
//!
//! Thin binary entry point. All logic lives in the `listsleuth-core`
//! and `listsleuth-cli` crates.

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = listsleuth_cli::Cli::from_env();

    // Logs go to stderr; stdout carries results.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("ListSleuth starting");

    listsleuth_cli::run(cli)
}
