//! Port traits: the seams the application layer programs against and
//! the providers layer implements.

pub mod embedding;
pub mod rerank;
pub mod vector_store;

pub use embedding::{EmbedOptions, EmbedOutcome, EmbeddingProvider, InputType, Usage};
pub use rerank::{RerankOutcome, RerankProvider};
pub use vector_store::{RawScore, RetrievedHit, VectorStoreProvider};
