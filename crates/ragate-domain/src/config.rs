//! Process-wide configuration shape (spec §3 "Configuration", §6).
//!
//! These types are pure data — loading/merging layered sources lives in
//! `ragate-application::config`, which resolves one of these from file
//! + environment and hands the result down as an explicit value
//! (spec §9 "Global config singleton").

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Active embedding provider configuration (spec §3, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingProviderConfig {
    /// Provider kind, e.g. `"openai"`, `"cohere"`, `"caikit"`.
    pub provider: String,
    /// Model identifier passed to the backend.
    pub model: String,
    /// Base URL of the backend API.
    pub base_url: String,
    /// Name of the environment variable holding the API key. Never the
    /// key itself — resolved at provider-construction time.
    pub api_key_env: String,
    /// Dense-vector output size, used to size collections on first
    /// upsert (spec §3 "Collection" dim is fixed at first upsert).
    pub dimensions: usize,
    /// Maximum items per embedding batch.
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
    /// Maximum estimated tokens per input before truncation.
    #[serde(default = "default_max_tokens_per_input")]
    pub max_tokens_per_input: usize,
}

fn default_max_batch() -> usize {
    96
}

fn default_max_tokens_per_input() -> usize {
    8191
}

/// Active rerank provider configuration, or disabled (spec §3, §4.4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum RerankProviderConfig {
    /// No reranking; identity permutation.
    None,
    /// Cohere `/v1/rerank`.
    Cohere {
        /// Base URL of the backend API.
        base_url: String,
        /// Model identifier.
        model: String,
        /// Env var name holding the API key.
        api_key_env: String,
        /// Maximum documents accepted per call.
        #[serde(default = "default_max_documents")]
        max_documents: usize,
    },
    /// Jina rerank endpoint (same shape as Cohere).
    Jina {
        /// Base URL of the backend API.
        base_url: String,
        /// Model identifier.
        model: String,
        /// Env var name holding the API key.
        api_key_env: String,
        /// Maximum documents accepted per call.
        #[serde(default = "default_max_documents")]
        max_documents: usize,
    },
    /// Caikit `/api/v1/task/rerank`.
    Caikit {
        /// Base URL of the backend API.
        base_url: String,
        /// Model identifier.
        model: String,
        /// Maximum documents accepted per call.
        #[serde(default = "default_max_documents")]
        max_documents: usize,
    },
}

fn default_max_documents() -> usize {
    1000
}

/// Which vector-store backend is active (spec §6 `GATEWAY_BACKEND`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Milvus REST API.
    Milvus,
    /// In-process backend, intended for tests only (spec §9).
    Memory,
}

/// Milvus connection settings (spec §6 `MILVUS_*`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MilvusConfig {
    /// Host name or address.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Username, if the deployment requires auth.
    #[serde(default)]
    pub user: Option<String>,
    /// Password, if the deployment requires auth.
    #[serde(default)]
    pub password: Option<String>,
    /// Default collection name.
    pub collection: String,
    /// Dense-vector dimension, when known ahead of first upsert.
    #[serde(default)]
    pub dim: Option<usize>,
}

/// Vector-store backend selection and settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStoreConfig {
    /// Active backend.
    pub backend: BackendKind,
    /// Milvus connection settings, required when `backend == Milvus`.
    #[serde(default)]
    pub milvus: Option<MilvusConfig>,
    /// Memory-backend document cap (spec §4.7 "Memory-backend variant").
    #[serde(default = "default_max_docs")]
    pub max_docs: usize,
    /// When true, startup fails fast if the configured backend is
    /// unreachable rather than silently degrading (spec §9).
    #[serde(default)]
    pub require_backend: bool,
}

fn default_max_docs() -> usize {
    100_000
}

/// Optional "service-first" URLs (spec §3, §4.3 "Service-first policy").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceUrls {
    /// Dedicated embedding microservice URL, tried before the direct provider.
    pub embedding_service_url: Option<String>,
    /// Dedicated rerank microservice URL, tried before the direct provider.
    pub rerank_service_url: Option<String>,
    /// Bearer token sent to the service URLs.
    pub service_auth_token: Option<String>,
}

/// Request timeout and default-value knobs (spec §5 "Timeouts", §3 "Defaults").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Defaults {
    /// Collection used when a request omits one.
    #[serde(default = "default_collection_name")]
    pub default_collection: String,
    /// Embedding/rerank remote call timeout.
    #[serde(default = "default_remote_timeout", with = "humantime_duration")]
    pub remote_timeout: Duration,
    /// Vector-store operation timeout.
    #[serde(default = "default_store_timeout", with = "humantime_duration")]
    pub store_timeout: Duration,
    /// Soft end-to-end request budget.
    #[serde(default = "default_request_budget", with = "humantime_duration")]
    pub request_budget: Duration,
    /// Reciprocal rank fusion constant (spec §4.5, §9).
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
}

fn default_collection_name() -> String {
    "default".to_owned()
}

fn default_remote_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_store_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_request_budget() -> Duration {
    Duration::from_secs(90)
}

fn default_rrf_k() -> u32 {
    60
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            default_collection: default_collection_name(),
            remote_timeout: default_remote_timeout(),
            store_timeout: default_store_timeout(),
            request_budget: default_request_budget(),
            rrf_k: default_rrf_k(),
        }
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Process-wide configuration, loaded once at startup (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Active embedding provider.
    pub embedding: EmbeddingProviderConfig,
    /// Active rerank provider, or `None` to disable reranking.
    #[serde(default = "default_rerank_none")]
    pub rerank: RerankProviderConfig,
    /// Vector-store backend selection.
    pub vector_store: VectorStoreConfig,
    /// Service-first URLs.
    #[serde(default)]
    pub service_urls: ServiceUrls,
    /// Shared bearer token; auth is disabled when empty/absent.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Defaults and timeouts.
    #[serde(default)]
    pub defaults: Defaults,
}

fn default_rerank_none() -> RerankProviderConfig {
    RerankProviderConfig::None
}
