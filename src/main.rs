//! Runway CLI entry point.

use clap::Parser;
use std::process::ExitCode;

use runway::cli::{handle_error, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            handle_error(&err, json);
            ExitCode::FAILURE
        }
    }
}
