//! Binary entry point.

use clap::Parser;
use ragate::{serve, Cli};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "startup failed");
            ExitCode::FAILURE
        }
    }
}

/// Builds the log filter from `RUST_LOG`, falling back to `GATEWAY_LOG`
/// and then `"info"` (spec §A "environment variable selects the filter
/// directive, defaulting to info").
fn init_tracing() {
    let directive = std::env::var("RUST_LOG").or_else(|_| std::env::var("GATEWAY_LOG")).unwrap_or_else(|_| "info".to_owned());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
}
