//! Cross-pipeline integration tests: upsert then search against the
//! same in-memory store (spec §8 "upsert-then-search round-trip").

use ragate_application::pipelines::{QueryPipeline, QueryRequest, UpsertDocument, UpsertMetadata, UpsertPipeline, UpsertRequest};
use ragate_domain::config::Defaults;
use ragate_domain::entities::Filters;
use ragate_domain::test_utils::HashEmbeddingProvider;
use ragate_providers::rerank::PassthroughRerankProvider;
use ragate_providers::vector_store::InMemoryVectorStore;
use std::sync::Arc;

#[tokio::test]
async fn upsert_then_search_round_trip() {
    let store = Arc::new(InMemoryVectorStore::new(10_000));
    let embedding = Arc::new(HashEmbeddingProvider);

    let upsert = UpsertPipeline::new(embedding.clone(), store.clone(), "docs");
    let upsert_response = upsert
        .run(UpsertRequest {
            documents: vec![
                UpsertDocument {
                    doc_id: Some("readme".to_owned()),
                    text: "installation instructions for the gateway".to_owned(),
                    metadata: UpsertMetadata {
                        file_name: Some("README.md".to_owned()),
                        mime_type: Some("text/markdown".to_owned()),
                        ..Default::default()
                    },
                },
                UpsertDocument {
                    doc_id: Some("license".to_owned()),
                    text: "MIT license terms and conditions".to_owned(),
                    metadata: UpsertMetadata {
                        file_name: Some("LICENSE".to_owned()),
                        mime_type: Some("text/plain".to_owned()),
                        ..Default::default()
                    },
                },
            ],
            collection: Some("docs".to_owned()),
            model: None,
        })
        .await
        .expect("upsert succeeds");

    assert_eq!(upsert_response.inserted, 2);
    assert_eq!(upsert_response.total, 2);

    let query = QueryPipeline::new(embedding, Arc::new(PassthroughRerankProvider), store.clone(), Defaults::default());
    let search_response = query
        .run(QueryRequest {
            query: "installation instructions".to_owned(),
            collection: Some("docs".to_owned()),
            top_k: 5,
            context_window: 0,
            filters: Filters::default(),
            model: None,
        })
        .await
        .expect("search succeeds");

    assert!(search_response.count >= 1);
    assert!(search_response.hits.iter().any(|hit| hit.doc_id == "readme"));

    let stats = store.get_collection_stats("docs").await.expect("stats ok");
    assert_eq!(stats.row_count, 2);
    assert!(stats.file_names.contains(&"README.md".to_owned()));
}

#[tokio::test]
async fn search_filter_by_mime_type_excludes_non_matching_hits() {
    let store = Arc::new(InMemoryVectorStore::new(10_000));
    let embedding = Arc::new(HashEmbeddingProvider);

    let upsert = UpsertPipeline::new(embedding.clone(), store.clone(), "docs");
    upsert
        .run(UpsertRequest {
            documents: vec![
                UpsertDocument {
                    doc_id: Some("a".to_owned()),
                    text: "alpha document body text".to_owned(),
                    metadata: UpsertMetadata {
                        mime_type: Some("text/markdown".to_owned()),
                        ..Default::default()
                    },
                },
                UpsertDocument {
                    doc_id: Some("b".to_owned()),
                    text: "alpha document body text again".to_owned(),
                    metadata: UpsertMetadata {
                        mime_type: Some("application/pdf".to_owned()),
                        ..Default::default()
                    },
                },
            ],
            collection: Some("docs".to_owned()),
            model: None,
        })
        .await
        .expect("upsert succeeds");

    let query = QueryPipeline::new(embedding, Arc::new(PassthroughRerankProvider), store, Defaults::default());
    let search_response = query
        .run(QueryRequest {
            query: "alpha document".to_owned(),
            collection: Some("docs".to_owned()),
            top_k: 5,
            context_window: 0,
            filters: Filters {
                mime_type: Some("application/pdf".to_owned()),
                ..Default::default()
            },
            model: None,
        })
        .await
        .expect("search succeeds");

    assert!(search_response.hits.iter().all(|hit| hit.doc_id != "a"));
}
