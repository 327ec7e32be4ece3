//! Quota admin standalone binary.

use std::process::ExitCode;

use clap::Parser;
use quota_limiter::{AdminArgs, cli};

#[tokio::main]
async fn main() -> ExitCode {
    let args = AdminArgs::parse();

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
