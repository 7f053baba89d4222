//! HTTP transport: router wiring, auth, error mapping, and handlers.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod request_id;
pub mod router;

pub use router::build_router;
