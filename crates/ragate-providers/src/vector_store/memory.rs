//! In-memory vector-store backend (spec §9 "Memory backend is a
//! test-only fallback"). A single mutex over one resident list is
//! acceptable because production deployments use the Milvus adapter
//! (spec §5 "Shared resources").

use crate::vector_store::rrf;
use async_trait::async_trait;
use ragate_domain::entities::{Chunk, CollectionStats, SurroundingChunk};
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::vector_store::{RawScore, RetrievedHit, VectorStoreProvider};
use std::collections::HashMap;
use std::sync::Mutex;

struct CollectionData {
    dim: usize,
    chunks: HashMap<String, Chunk>,
}

/// Resident, test-only vector store. Holds everything in a single
/// `Mutex`-protected map; never shares state across processes.
pub struct InMemoryVectorStore {
    collections: Mutex<HashMap<String, CollectionData>>,
    max_docs: usize,
}

impl InMemoryVectorStore {
    /// Builds an empty store capped at `max_docs` total chunks across
    /// all collections (spec §4.7 "Memory-backend variant").
    pub fn new(max_docs: usize) -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            max_docs,
        }
    }

    fn total_docs(collections: &HashMap<String, CollectionData>) -> usize {
        collections.values().map(|c| c.chunks.len()).sum()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Crude lexical overlap score: count of query terms present in the
/// document, case-insensitive. Sufficient for a test-only backend;
/// production BM25 scoring lives in the Milvus adapter.
fn lexical_score(query_text: &str, doc_text: &str) -> f32 {
    let query_terms: Vec<String> = query_text.split_whitespace().map(|t| t.to_lowercase()).collect();
    if query_terms.is_empty() {
        return 0.0;
    }
    let doc_lower = doc_text.to_lowercase();
    let matches = query_terms.iter().filter(|t| doc_lower.contains(t.as_str())).count();
    matches as f32 / query_terms.len() as f32
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn ensure_collection(&self, name: &str, dim: usize) -> Result<()> {
        let mut collections = self.collections.lock().expect("memory store mutex poisoned");
        collections.entry(name.to_owned()).or_insert_with(|| CollectionData {
            dim,
            chunks: HashMap::new(),
        });
        Ok(())
    }

    async fn get_or_create_collection(&self, name: &str, dim: usize) -> Result<usize> {
        let mut collections = self.collections.lock().expect("memory store mutex poisoned");
        let data = collections.entry(name.to_owned()).or_insert_with(|| CollectionData {
            dim,
            chunks: HashMap::new(),
        });
        Ok(data.dim)
    }

    async fn insert_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.lock().expect("memory store mutex poisoned");

        // Chunks that already exist under this chunk_id are replaced in place
        // (upsert-replace), so only genuinely new ids grow the resident total.
        let replacing = chunks
            .iter()
            .filter(|c| collections.get(collection).is_some_and(|data| data.chunks.contains_key(&c.chunk_id)))
            .count();
        let net_new = chunks.len() - replacing;
        let projected = Self::total_docs(&collections) + net_new;
        if projected > self.max_docs {
            return Err(Error::capacity(self.max_docs, projected));
        }

        let data = collections
            .get_mut(collection)
            .ok_or_else(|| Error::not_found("collection", collection))?;
        for chunk in chunks {
            // Upsert-replace on duplicate chunk_id (DESIGN.md Open Question #1).
            data.chunks.insert(chunk.chunk_id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn hybrid_search(
        &self,
        collection: &str,
        query_vector: &[f32],
        query_text: &str,
        top_k: usize,
        overfetch: usize,
        rrf_k: u32,
    ) -> Result<Vec<RetrievedHit>> {
        let collections = self.collections.lock().expect("memory store mutex poisoned");
        let data = match collections.get(collection) {
            Some(data) => data,
            None => return Ok(Vec::new()),
        };

        let mut dense_ranked: Vec<(String, f32)> = data
            .chunks
            .values()
            .map(|c| (c.chunk_id.clone(), cosine_similarity(query_vector, &c.dense_vector)))
            .collect();
        dense_ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        dense_ranked.truncate(overfetch.max(top_k));

        let mut lexical_ranked: Vec<(String, f32)> = data
            .chunks
            .values()
            .map(|c| (c.chunk_id.clone(), lexical_score(query_text, &c.text)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        lexical_ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        lexical_ranked.truncate(overfetch.max(top_k));

        let dense_ids: Vec<String> = dense_ranked.into_iter().map(|(id, _)| id).collect();
        let lexical_ids: Vec<String> = lexical_ranked.into_iter().map(|(id, _)| id).collect();
        let fused = rrf::fuse(&[dense_ids, lexical_ids], rrf_k);

        let hits = fused
            .into_iter()
            .take(top_k.max(overfetch))
            .filter_map(|(chunk_id, _)| data.chunks.get(&chunk_id))
            .map(|chunk| RetrievedHit {
                chunk: chunk.clone(),
                raw_score: RawScore::CosineSimilarity(cosine_similarity(query_vector, &chunk.dense_vector)),
            })
            .collect();

        Ok(hits)
    }

    async fn get_context_chunks(&self, collection: &str, file_name: &str, chunk_index: u64, window: u32) -> Result<Vec<SurroundingChunk>> {
        let collections = self.collections.lock().expect("memory store mutex poisoned");
        let data = match collections.get(collection) {
            Some(data) => data,
            None => return Ok(Vec::new()),
        };

        let window = window as u64;
        let low = chunk_index.saturating_sub(window);
        let high = chunk_index.saturating_add(window);

        let mut neighbors: Vec<SurroundingChunk> = data
            .chunks
            .values()
            .filter(|c| c.file_name == file_name && c.chunk_index >= low && c.chunk_index <= high && c.chunk_index != chunk_index)
            .map(|c| SurroundingChunk {
                chunk_index: c.chunk_index,
                text: c.text.clone(),
                page: c.page,
            })
            .collect();
        neighbors.sort_by_key(|c| c.chunk_index);
        Ok(neighbors)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.lock().expect("memory store mutex poisoned");
        Ok(collections.keys().cloned().collect())
    }

    async fn get_collection_stats(&self, name: &str) -> Result<CollectionStats> {
        let collections = self.collections.lock().expect("memory store mutex poisoned");
        let data = collections.get(name).ok_or_else(|| Error::not_found("collection", name))?;

        let mut file_names: Vec<String> = data.chunks.values().map(|c| c.file_name.clone()).collect();
        file_names.sort();
        file_names.dedup();

        let mut mime_types: Vec<String> = data.chunks.values().map(|c| c.mime_type.clone()).collect();
        mime_types.sort();
        mime_types.dedup();

        Ok(CollectionStats {
            name: name.to_owned(),
            row_count: data.chunks.len() as u64,
            file_names,
            mime_types,
        })
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
