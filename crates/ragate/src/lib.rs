//! Retrieval gateway binary: CLI argument parsing and the startup
//! sequence that wires configuration, providers, and the HTTP server
//! together. The HTTP transport itself lives in `ragate-server`.

pub mod cli;
pub mod startup;

pub use cli::Cli;
pub use startup::serve;
