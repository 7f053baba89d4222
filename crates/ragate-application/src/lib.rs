//! Application layer: config loading, provider resolution (C2), and
//! the query/upsert request pipelines (C6, C7).

pub mod config;
pub mod filters;
pub mod pipelines;
pub mod providers;
