//! Vector-store adapters (C5): Milvus for production, an in-memory
//! backend for tests and local development.

pub mod memory;
#[cfg(feature = "vectorstore-milvus")]
pub mod milvus;
pub mod rrf;

pub use memory::InMemoryVectorStore;
#[cfg(feature = "vectorstore-milvus")]
pub use milvus::MilvusVectorStore;
