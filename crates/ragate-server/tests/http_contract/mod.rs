//! HTTP contract tests (spec §8): exercised through the full Axum
//! router via `tower::ServiceExt::oneshot`, never a running socket.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ragate_domain::config::{BackendKind, Defaults, EmbeddingProviderConfig, RagConfig, RerankProviderConfig, ServiceUrls, VectorStoreConfig};
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::{RerankOutcome, RerankProvider};
use ragate_domain::test_utils::HashEmbeddingProvider;
use ragate_providers::rerank::PassthroughRerankProvider;
use ragate_providers::vector_store::InMemoryVectorStore;
use ragate_server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct AlwaysFailsRerankProvider;

#[async_trait]
impl RerankProvider for AlwaysFailsRerankProvider {
    async fn rerank(&self, _query: &str, _docs: &[String], _top_n: Option<usize>) -> Result<RerankOutcome> {
        Err(Error::remote("rerank-fails", "simulated failure"))
    }
    fn supports_scores(&self) -> bool {
        false
    }
    fn provider_name(&self) -> &str {
        "always-fails"
    }
    fn max_documents(&self) -> usize {
        1000
    }
}

fn base_config(auth_token: Option<&str>) -> RagConfig {
    RagConfig {
        embedding: EmbeddingProviderConfig {
            provider: "caikit".to_owned(),
            model: "test-model".to_owned(),
            base_url: "http://localhost:9999".to_owned(),
            api_key_env: String::new(),
            dimensions: 2,
            max_batch: 96,
            max_tokens_per_input: 8191,
        },
        rerank: RerankProviderConfig::None,
        vector_store: VectorStoreConfig {
            backend: BackendKind::Memory,
            milvus: None,
            max_docs: 10_000,
            require_backend: false,
        },
        service_urls: ServiceUrls::default(),
        auth_token: auth_token.map(str::to_owned),
        defaults: Defaults::default(),
    }
}

fn test_router(auth_token: Option<&str>, rerank: Arc<dyn RerankProvider>) -> Router {
    let config = Arc::new(base_config(auth_token));
    let embedding = Arc::new(HashEmbeddingProvider);
    let vector_store = Arc::new(InMemoryVectorStore::new(config.vector_store.max_docs));
    build_router(AppState::new(config, embedding, rerank, vector_store))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body collects").to_bytes();
    let body: Value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json body") };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

#[tokio::test]
async fn upsert_then_search_round_trip() {
    let router = test_router(None, Arc::new(PassthroughRerankProvider));

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/upsert",
            json!({
                "documents": [
                    {"doc_id": "readme", "text": "installation instructions for the gateway", "file_name": "README.md"},
                    {"doc_id": "license", "text": "MIT license terms and conditions", "file_name": "LICENSE"}
                ],
                "collection": "docs"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["total"], 2);

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/search",
            json!({"query": "installation instructions", "collection": "docs", "top_k": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["hits"].as_array().expect("hits array").iter().any(|hit| hit["doc_id"] == "readme"));
}

#[tokio::test]
async fn search_neighbor_expansion_attaches_surrounding_chunks() {
    let router = test_router(None, Arc::new(PassthroughRerankProvider));

    send(
        &router,
        json_request(
            "POST",
            "/upsert",
            json!({
                "documents": [
                    {"doc_id": "c0", "text": "chunk zero", "file_name": "a.txt", "chunk_index": 0},
                    {"doc_id": "c1", "text": "chunk one", "file_name": "a.txt", "chunk_index": 1},
                    {"doc_id": "c2", "text": "chunk two", "file_name": "a.txt", "chunk_index": 2}
                ],
                "collection": "docs"
            }),
        ),
    )
    .await;

    let (status, body) = send(
        &router,
        json_request("POST", "/search", json!({"query": "chunk one", "collection": "docs", "top_k": 1, "context_window": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hits"].as_array().expect("hits array").len(), 1);
}

#[tokio::test]
async fn search_filter_excludes_non_matching_mime_type() {
    let router = test_router(None, Arc::new(PassthroughRerankProvider));

    send(
        &router,
        json_request(
            "POST",
            "/upsert",
            json!({
                "documents": [
                    {"doc_id": "a", "text": "alpha document body text", "mime_type": "text/markdown"},
                    {"doc_id": "b", "text": "alpha document body text again", "mime_type": "application/pdf"}
                ],
                "collection": "docs"
            }),
        ),
    )
    .await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/search",
            json!({"query": "alpha document", "collection": "docs", "top_k": 5, "filters": {"mime_type": "application/pdf"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["hits"].as_array().expect("hits array").iter().all(|hit| hit["doc_id"] != "a"));
}

#[tokio::test]
async fn rerank_failure_degrades_instead_of_failing_the_request() {
    let router = test_router(None, Arc::new(AlwaysFailsRerankProvider));

    send(
        &router,
        json_request("POST", "/upsert", json!({"documents": [{"text": "alpha"}], "collection": "docs"})),
    )
    .await;

    let (status, body) = send(&router, json_request("POST", "/search", json!({"query": "alpha", "collection": "docs"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reranked"], false);
}

#[tokio::test]
async fn collection_stats_is_not_found_for_unknown_collection() {
    let router = test_router(None, Arc::new(PassthroughRerankProvider));
    let (status, _) = send(&router, Request::builder().method("GET").uri("/collections/missing/stats").body(Body::empty()).expect("valid request")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_without_credentials_are_rejected_when_auth_is_configured() {
    let router = test_router(Some("secret-token"), Arc::new(PassthroughRerankProvider));
    let (status, _) = send(&router, json_request("POST", "/search", json!({"query": "alpha"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_token_satisfies_auth() {
    let router = test_router(Some("secret-token"), Arc::new(PassthroughRerankProvider));
    let request = Request::builder()
        .method("POST")
        .uri("/search")
        .header("content-type", "application/json")
        .header("authorization", "Bearer secret-token")
        .body(Body::from(json!({"query": "alpha"}).to_string()))
        .expect("valid request");
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_key_header_satisfies_auth() {
    let router = test_router(Some("secret-token"), Arc::new(PassthroughRerankProvider));
    let request = Request::builder()
        .method("POST")
        .uri("/search")
        .header("content-type", "application/json")
        .header("x-api-key", "secret-token")
        .body(Body::from(json!({"query": "alpha"}).to_string()))
        .expect("valid request");
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn healthz_bypasses_auth() {
    let router = test_router(Some("secret-token"), Arc::new(PassthroughRerankProvider));
    let (status, body) = send(&router, Request::builder().method("GET").uri("/healthz").body(Body::empty()).expect("valid request")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "memory");
}
