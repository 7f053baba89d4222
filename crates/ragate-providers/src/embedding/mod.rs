//! Embedding provider implementations (C3).

pub mod batching;
#[cfg(feature = "embedding-caikit")]
pub mod caikit;
#[cfg(feature = "embedding-cohere")]
pub mod cohere;
#[cfg(feature = "embedding-openai")]
pub mod openai;
pub mod service_first;

#[cfg(feature = "embedding-caikit")]
pub use caikit::CaikitEmbeddingProvider;
#[cfg(feature = "embedding-cohere")]
pub use cohere::CohereEmbeddingProvider;
#[cfg(feature = "embedding-openai")]
pub use openai::OpenAiCompatibleProvider;
pub use service_first::ServiceFirstEmbeddingProvider;
