//! Unified quota-rs CLI.
//!
//! This binary provides a unified interface to all quota components:
//! - `quota-rs serve` - Run the quota HTTP service
//! - `quota-rs admin` - Inspect usage counters (SQL backend)
//!
//! Each subcommand can also be run as a standalone binary.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Quota-rs unified CLI.
#[derive(Parser)]
#[command(
    name = "quota-rs",
    version,
    about = "Per-user daily usage quotas",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the quota HTTP service.
    #[command(name = "serve", alias = "server")]
    Serve(Box<quota_server::ServerArgs>),

    /// Inspect usage counters (SQL backend).
    #[command(name = "admin")]
    Admin(quota_limiter::AdminArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => quota_server::cli::run(*args).await,
        Commands::Admin(args) => quota_limiter::cli::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
