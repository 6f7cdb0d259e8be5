// src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod cli_commands;

use cli::Cli;
use cli_commands::run_command;

fn init_logging() {
    // logs go to stderr so stdout stays clean for addresses and hashes
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the main application logic based on CLI flags.
fn run_app(cli: Cli) -> Result<(), String> {
    run_command(&cli)
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run_app(cli) {
        eprintln!("FATAL ERROR: {}", e);
        std::process::exit(1);
    }
}
