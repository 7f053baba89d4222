//! Command-line surface (spec §6 "startup").

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Retrieval gateway: an HTTP service coordinating embedding,
/// reranking, and vector-store backends.
#[derive(Debug, Parser)]
#[command(name = "ragate", version, about)]
pub struct Cli {
    /// Path to a TOML config file. Overrides `GATEWAY_CONFIG` and the
    /// standard search paths (spec §6 `GATEWAY_CONFIG`).
    #[arg(long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
}
