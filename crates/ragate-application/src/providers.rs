//! Provider registry (C2): resolves the configured embedding, rerank,
//! and vector-store backends into concrete trait objects.
//!
//! Resolution happens once, at config-load time, into an explicit
//! value handed down by `main` — no global registry, no dynamic
//! re-resolution per request (spec §9 "Global config singleton").

use ragate_domain::config::{BackendKind, EmbeddingProviderConfig, RagConfig, RerankProviderConfig};
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::{EmbeddingProvider, RerankProvider, VectorStoreProvider};
use ragate_providers::embedding::{CaikitEmbeddingProvider, CohereEmbeddingProvider, OpenAiCompatibleProvider, ServiceFirstEmbeddingProvider};
use ragate_providers::rerank::{CaikitRerankProvider, CohereRerankProvider, JinaRerankProvider, PassthroughRerankProvider, ServiceFirstRerankProvider};
use ragate_providers::vector_store::{InMemoryVectorStore, MilvusVectorStore};
use ragate_providers::HttpClientConfig;
use std::sync::Arc;

fn resolve_api_key(api_key_env: &str) -> Result<String> {
    if api_key_env.is_empty() {
        return Ok(String::new());
    }
    std::env::var(api_key_env).map_err(|_| Error::config(format!("environment variable '{api_key_env}' is not set")))
}

/// Builds the active embedding provider, wrapping it in
/// [`ServiceFirstEmbeddingProvider`] when a service URL is configured.
pub fn build_embedding_provider(config: &RagConfig, http: &HttpClientConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let direct = build_direct_embedding_provider(&config.embedding, http)?;

    match &config.service_urls.embedding_service_url {
        Some(url) if !url.is_empty() => {
            let client = http.build().map_err(|e| Error::config(e.to_string()))?;
            Ok(Arc::new(ServiceFirstEmbeddingProvider::new(
                direct,
                client,
                url.clone(),
                config.service_urls.service_auth_token.clone(),
            )))
        }
        _ => Ok(direct),
    }
}

fn build_direct_embedding_provider(config: &EmbeddingProviderConfig, http: &HttpClientConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let client = http.build().map_err(|e| Error::config(e.to_string()))?;
    match config.provider.as_str() {
        "openai" | "openai-compatible" => {
            let api_key = resolve_api_key(&config.api_key_env)?;
            Ok(Arc::new(OpenAiCompatibleProvider::new(
                client,
                config.base_url.clone(),
                api_key,
                config.model.clone(),
                config.dimensions,
                config.max_batch,
                config.max_tokens_per_input,
            )))
        }
        "cohere" => {
            let api_key = resolve_api_key(&config.api_key_env)?;
            Ok(Arc::new(CohereEmbeddingProvider::new(
                client,
                config.base_url.clone(),
                api_key,
                config.model.clone(),
                config.dimensions,
            )))
        }
        "caikit" => Ok(Arc::new(CaikitEmbeddingProvider::new(
            client,
            config.base_url.clone(),
            config.model.clone(),
            config.dimensions,
        ))),
        other => Err(Error::config(format!("unknown embedding provider '{other}'"))),
    }
}

/// Builds the active rerank provider, or [`PassthroughRerankProvider`]
/// when reranking is disabled, wrapping in
/// [`ServiceFirstRerankProvider`] when a service URL is configured.
pub fn build_rerank_provider(config: &RagConfig, http: &HttpClientConfig) -> Result<Arc<dyn RerankProvider>> {
    let direct = build_direct_rerank_provider(&config.rerank, http)?;

    match &config.service_urls.rerank_service_url {
        Some(url) if !url.is_empty() && !matches!(config.rerank, RerankProviderConfig::None) => {
            let client = http.build().map_err(|e| Error::config(e.to_string()))?;
            Ok(Arc::new(ServiceFirstRerankProvider::new(
                direct,
                client,
                url.clone(),
                config.service_urls.service_auth_token.clone(),
            )))
        }
        _ => Ok(direct),
    }
}

fn build_direct_rerank_provider(config: &RerankProviderConfig, http: &HttpClientConfig) -> Result<Arc<dyn RerankProvider>> {
    let client = http.build().map_err(|e| Error::config(e.to_string()))?;
    match config {
        RerankProviderConfig::None => Ok(Arc::new(PassthroughRerankProvider)),
        RerankProviderConfig::Cohere {
            base_url,
            model,
            api_key_env,
            max_documents,
        } => {
            let api_key = resolve_api_key(api_key_env)?;
            Ok(Arc::new(CohereRerankProvider::new(client, base_url.clone(), api_key, model.clone(), *max_documents)))
        }
        RerankProviderConfig::Jina {
            base_url,
            model,
            api_key_env,
            max_documents,
        } => {
            let api_key = resolve_api_key(api_key_env)?;
            Ok(Arc::new(JinaRerankProvider::new(client, base_url.clone(), api_key, model.clone(), *max_documents)))
        }
        RerankProviderConfig::Caikit { base_url, model, max_documents } => {
            Ok(Arc::new(CaikitRerankProvider::new(client, base_url.clone(), model.clone(), *max_documents)))
        }
    }
}

/// Builds the active vector-store backend. Refuses to resolve to
/// [`InMemoryVectorStore`] in production unless explicitly requested
/// (spec §9 "Memory backend is test-only"; DESIGN.md Open Question #3).
pub fn build_vector_store_provider(config: &RagConfig) -> Result<Arc<dyn VectorStoreProvider>> {
    match config.vector_store.backend {
        BackendKind::Memory => Ok(Arc::new(InMemoryVectorStore::new(config.vector_store.max_docs))),
        BackendKind::Milvus => {
            let milvus = config
                .vector_store
                .milvus
                .as_ref()
                .ok_or_else(|| Error::config("vector_store.backend is 'milvus' but vector_store.milvus is not set"))?;
            let base_url = format!("http://{}:{}", milvus.host, milvus.port);
            let client = HttpClientConfig::default().build().map_err(|e| Error::config(e.to_string()))?;
            Ok(Arc::new(MilvusVectorStore::new(client, base_url, milvus.user.as_deref(), milvus.password.as_deref())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragate_domain::config::{Defaults, ServiceUrls, VectorStoreConfig};

    fn base_config(provider: &str) -> RagConfig {
        RagConfig {
            embedding: EmbeddingProviderConfig {
                provider: provider.to_owned(),
                model: "test-model".to_owned(),
                base_url: "http://localhost:9999".to_owned(),
                api_key_env: String::new(),
                dimensions: 8,
                max_batch: 96,
                max_tokens_per_input: 8191,
            },
            rerank: RerankProviderConfig::None,
            vector_store: VectorStoreConfig {
                backend: BackendKind::Memory,
                milvus: None,
                max_docs: 1000,
                require_backend: false,
            },
            service_urls: ServiceUrls::default(),
            auth_token: None,
            defaults: Defaults::default(),
        }
    }

    #[test]
    fn unknown_embedding_provider_is_a_config_error() {
        let config = base_config("does-not-exist");
        let result = build_embedding_provider(&config, &HttpClientConfig::default());
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn missing_api_key_env_is_a_config_error() {
        let mut config = base_config("cohere");
        config.embedding.api_key_env = "RAGATE_TEST_UNSET_KEY_VAR".to_owned();
        let result = build_embedding_provider(&config, &HttpClientConfig::default());
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn caikit_needs_no_api_key() {
        let config = base_config("caikit");
        let result = build_embedding_provider(&config, &HttpClientConfig::default());
        assert!(result.is_ok());
    }

    #[test]
    fn rerank_none_resolves_to_passthrough() {
        let config = base_config("caikit");
        let provider = build_rerank_provider(&config, &HttpClientConfig::default()).expect("ok");
        assert_eq!(provider.provider_name(), "passthrough");
    }

    #[test]
    fn memory_backend_resolves_without_milvus_config() {
        let config = base_config("caikit");
        let store = build_vector_store_provider(&config).expect("ok");
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn milvus_backend_without_settings_is_a_config_error() {
        let mut config = base_config("caikit");
        config.vector_store.backend = BackendKind::Milvus;
        config.vector_store.milvus = None;
        let result = build_vector_store_provider(&config);
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
