//! Request pipelines (C6 query, C7 upsert).

pub mod query;
pub mod upsert;

pub use query::{QueryError, QueryPipeline, QueryRequest, QueryResponse};
pub use upsert::{UpsertDocument, UpsertError, UpsertMetadata, UpsertPipeline, UpsertRequest, UpsertResponse};
