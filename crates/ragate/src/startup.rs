//! Startup sequence (spec §6): load config, resolve providers, then
//! hand off to the server layer to bind and serve.

use crate::cli::Cli;
use ragate_application::{config, providers};
use ragate_domain::config::{RagConfig, RerankProviderConfig};
use ragate_domain::ports::VectorStoreProvider;
use ragate_providers::HttpClientConfig;
use ragate_server::AppState;
use std::sync::Arc;

/// Loads configuration, resolves providers, and serves HTTP traffic
/// until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error on config misconfiguration, provider-resolution
/// failure, a failed startup backend health check, or a bind failure
/// (spec §6 "non-zero exit on startup misconfiguration").
pub async fn serve(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.config {
        std::env::set_var("GATEWAY_CONFIG", path);
    }

    tracing::info!(source = %config::describe_source(), "resolving configuration");
    let config = Arc::new(config::load()?);
    let http = HttpClientConfig::default();

    let embedding = providers::build_embedding_provider(&config, &http)?;
    let rerank = providers::build_rerank_provider(&config, &http)?;
    let vector_store = providers::build_vector_store_provider(&config)?;

    if config.vector_store.require_backend {
        vector_store
            .health_check()
            .await
            .map_err(|error| anyhow::anyhow!("backend health check failed at startup: {error}"))?;
    }

    log_startup(&config);

    let state = AppState::new(Arc::clone(&config), embedding, rerank, vector_store);
    ragate_server::serve(cli.bind, state).await?;
    Ok(())
}

fn log_startup(config: &RagConfig) {
    let rerank_provider = match &config.rerank {
        RerankProviderConfig::None => "none",
        RerankProviderConfig::Cohere { .. } => "cohere",
        RerankProviderConfig::Jina { .. } => "jina",
        RerankProviderConfig::Caikit { .. } => "caikit",
    };
    tracing::info!(
        embedding_provider = %config.embedding.provider,
        vector_store_backend = ?config.vector_store.backend,
        rerank_provider,
        "starting ragate"
    );
}
