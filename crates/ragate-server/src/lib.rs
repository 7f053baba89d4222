//! HTTP transport layer for the retrieval gateway (C8, spec §4.8).
//!
//! Wires the application layer's pipelines onto an Axum router: auth,
//! error-to-status mapping, request handlers, and structured per-request
//! logging. No business logic lives here — only HTTP concerns.

pub mod http;
pub mod serve;
pub mod state;

pub use http::build_router;
pub use serve::serve;
pub use state::AppState;
