//! Milvus vector-store adapter (spec §4.5-§4.7), talking to the Milvus
//! v2 REST surface (`/v2/vectordb/...`) rather than the gRPC SDK, so the
//! provider stack stays on one HTTP client family end to end.

use async_trait::async_trait;
use ragate_domain::entities::{Chunk, CollectionStats, SurroundingChunk};
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::vector_store::{RawScore, RetrievedHit, VectorStoreProvider};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::vector_store::rrf;

/// Bound on distinct-value sampling for [`CollectionStats`] (DESIGN.md
/// Open Question #2: Milvus has no cheap distinct-value aggregate, so
/// stats are computed over a bounded scroll rather than a full scan).
const STATS_SAMPLE_LIMIT: u64 = 10_000;

pub struct MilvusVectorStore {
    client: reqwest::Client,
    base_url: String,
    auth_header: Option<String>,
    db_name: String,
}

impl MilvusVectorStore {
    /// Builds an adapter against a Milvus proxy at `base_url`. `user`/
    /// `password` are combined into a basic-auth token if both are set.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, user: Option<&str>, password: Option<&str>) -> Self {
        let auth_header = match (user, password) {
            (Some(u), Some(p)) if !u.is_empty() => Some(format!("{u}:{p}")),
            _ => None,
        };
        Self {
            client,
            base_url: base_url.into(),
            auth_header,
            db_name: "default".to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.auth_header {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::remote(self.backend_name(), e.to_string()))?;

        let status = response.status();
        let parsed: Value = response
            .json()
            .await
            .map_err(|e| Error::format(self.backend_name(), e.to_string()))?;

        if !status.is_success() || parsed.get("code").and_then(Value::as_i64).is_some_and(|code| code != 0) {
            return Err(Error::remote(self.backend_name(), parsed.to_string()));
        }
        Ok(parsed)
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let body = json!({ "dbName": self.db_name, "collectionName": name });
        match self.post_json("/v2/vectordb/collections/has", body).await {
            Ok(value) => Ok(value.get("data").and_then(|d| d.get("has")).and_then(Value::as_bool).unwrap_or(false)),
            Err(err) => Err(err),
        }
    }

    async fn create_collection(&self, name: &str, dim: usize) -> Result<()> {
        let body = json!({
            "dbName": self.db_name,
            "collectionName": name,
            "dimension": dim,
            "metricType": "COSINE",
            "primaryFieldName": "chunk_id",
            "vectorFieldName": "dense_vector",
            "idType": "VarChar",
            "params": { "max_length": 256 },
        });
        self.post_json("/v2/vectordb/collections/create", body).await?;
        Ok(())
    }

    fn chunk_to_row(chunk: &Chunk) -> Value {
        json!({
            "chunk_id": chunk.chunk_id,
            "text": chunk.text,
            "file_name": chunk.file_name,
            "file_path": chunk.file_path,
            "page": chunk.page,
            "section": chunk.section,
            "mime_type": chunk.mime_type,
            "chunk_index": chunk.chunk_index,
            "created_at_ts": chunk.created_at_ts,
            "dense_vector": chunk.dense_vector,
        })
    }

    fn row_to_chunk(row: &Value) -> Option<Chunk> {
        Some(Chunk {
            chunk_id: row.get("chunk_id")?.as_str()?.to_owned(),
            text: row.get("text").and_then(Value::as_str).unwrap_or_default().to_owned(),
            file_name: row.get("file_name").and_then(Value::as_str).unwrap_or_default().to_owned(),
            file_path: row.get("file_path").and_then(Value::as_str).unwrap_or_default().to_owned(),
            page: row.get("page").and_then(Value::as_i64).unwrap_or(-1),
            section: row.get("section").and_then(Value::as_str).unwrap_or_default().to_owned(),
            mime_type: row.get("mime_type").and_then(Value::as_str).unwrap_or_default().to_owned(),
            chunk_index: row.get("chunk_index").and_then(Value::as_u64).unwrap_or(0),
            created_at_ts: row.get("created_at_ts").and_then(Value::as_i64).unwrap_or(0),
            dense_vector: Vec::new(),
            sparse_vector: None,
        })
    }
}

#[derive(Deserialize)]
struct SearchResponseEnvelope {
    data: Vec<SearchHitRow>,
}

#[derive(Deserialize, Serialize)]
struct SearchHitRow {
    #[serde(flatten)]
    fields: Value,
    distance: f32,
}

#[async_trait]
impl VectorStoreProvider for MilvusVectorStore {
    async fn ensure_collection(&self, name: &str, dim: usize) -> Result<()> {
        if !self.collection_exists(name).await? {
            self.create_collection(name, dim).await?;
        }
        Ok(())
    }

    async fn get_or_create_collection(&self, name: &str, dim: usize) -> Result<usize> {
        if self.collection_exists(name).await? {
            let body = json!({ "dbName": self.db_name, "collectionName": name });
            let described = self.post_json("/v2/vectordb/collections/describe", body).await?;
            let existing_dim = described
                .pointer("/data/dimension")
                .and_then(Value::as_u64)
                .map(|d| d as usize)
                .unwrap_or(dim);
            Ok(existing_dim)
        } else {
            self.create_collection(name, dim).await?;
            Ok(dim)
        }
    }

    async fn insert_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        // Upsert-replace on duplicate chunk_id (DESIGN.md Open Question #1):
        // Milvus's native upsert endpoint deletes-then-inserts by primary key.
        let rows: Vec<Value> = chunks.iter().map(Self::chunk_to_row).collect();
        let body = json!({
            "dbName": self.db_name,
            "collectionName": collection,
            "data": rows,
        });
        self.post_json("/v2/vectordb/entities/upsert", body).await?;
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
        let limit = overfetch.max(top_k);

        let dense_body = json!({
            "dbName": self.db_name,
            "collectionName": collection,
            "data": [query_vector],
            "annsField": "dense_vector",
            "limit": limit,
            "outputFields": ["chunk_id", "text", "file_name", "file_path", "page", "section", "mime_type", "chunk_index", "created_at_ts"],
        });
        let dense_response = self.post_json("/v2/vectordb/entities/search", dense_body).await?;
        let dense_hits: SearchResponseEnvelope = serde_json::from_value(
            json!({ "data": dense_response.get("data").cloned().unwrap_or_default() }),
        )
        .map_err(|e| Error::format(self.backend_name(), e.to_string()))?;

        let lexical_body = json!({
            "dbName": self.db_name,
            "collectionName": collection,
            "filter": format!("text like \"%{}%\"", query_text.replace('"', "")),
            "limit": limit,
            "outputFields": ["chunk_id", "text", "file_name", "file_path", "page", "section", "mime_type", "chunk_index", "created_at_ts"],
        });
        let lexical_response = self.post_json("/v2/vectordb/entities/query", lexical_body).await.unwrap_or_else(|_| json!({ "data": [] }));
        let lexical_rows: Vec<Value> = lexical_response.get("data").and_then(Value::as_array).cloned().unwrap_or_default();

        let mut by_id: std::collections::HashMap<String, (Chunk, f32)> = std::collections::HashMap::new();
        let mut dense_ids = Vec::new();
        for hit in &dense_hits.data {
            if let Some(chunk) = Self::row_to_chunk(&hit.fields) {
                dense_ids.push(chunk.chunk_id.clone());
                by_id.insert(chunk.chunk_id.clone(), (chunk, hit.distance));
            }
        }
        let mut lexical_ids = Vec::new();
        for row in &lexical_rows {
            if let Some(chunk) = Self::row_to_chunk(row) {
                lexical_ids.push(chunk.chunk_id.clone());
                by_id.entry(chunk.chunk_id.clone()).or_insert((chunk, 1.0));
            }
        }

        let fused = rrf::fuse(&[dense_ids, lexical_ids], rrf_k);
        let hits = fused
            .into_iter()
            .take(limit)
            .filter_map(|(chunk_id, _)| by_id.remove(&chunk_id))
            .map(|(chunk, distance)| RetrievedHit {
                chunk,
                raw_score: RawScore::CosineDistance(distance),
            })
            .collect();
        Ok(hits)
    }

    async fn get_context_chunks(&self, collection: &str, file_name: &str, chunk_index: u64, window: u32) -> Result<Vec<SurroundingChunk>> {
        let window = u64::from(window);
        let low = chunk_index.saturating_sub(window);
        let high = chunk_index.saturating_add(window);
        let filter = format!(
            "file_name == \"{}\" && chunk_index >= {} && chunk_index <= {} && chunk_index != {}",
            file_name.replace('"', ""),
            low,
            high,
            chunk_index
        );
        let body = json!({
            "dbName": self.db_name,
            "collectionName": collection,
            "filter": filter,
            "limit": (window * 2 + 1),
            "outputFields": ["chunk_index", "text", "page"],
        });
        let response = self.post_json("/v2/vectordb/entities/query", body).await?;
        let rows: Vec<Value> = response.get("data").and_then(Value::as_array).cloned().unwrap_or_default();

        let mut neighbors: Vec<SurroundingChunk> = rows
            .iter()
            .filter_map(|row| {
                Some(SurroundingChunk {
                    chunk_index: row.get("chunk_index")?.as_u64()?,
                    text: row.get("text").and_then(Value::as_str).unwrap_or_default().to_owned(),
                    page: row.get("page").and_then(Value::as_i64).unwrap_or(-1),
                })
            })
            .collect();
        neighbors.sort_by_key(|c| c.chunk_index);
        Ok(neighbors)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let body = json!({ "dbName": self.db_name });
        let response = self.post_json("/v2/vectordb/collections/list", body).await?;
        let names = response
            .get("data")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
            .unwrap_or_default();
        Ok(names)
    }

    async fn get_collection_stats(&self, name: &str) -> Result<CollectionStats> {
        let describe_body = json!({ "dbName": self.db_name, "collectionName": name });
        let described = self.post_json("/v2/vectordb/collections/describe", describe_body).await?;
        let row_count = described.pointer("/data/rowCount").and_then(Value::as_u64).unwrap_or(0);

        // Distinct file_name/mime_type values have no direct Milvus aggregate,
        // so we approximate over a bounded sample rather than a full scan
        // (DESIGN.md Open Question #2).
        let query_body = json!({
            "dbName": self.db_name,
            "collectionName": name,
            "filter": "chunk_index >= 0",
            "limit": STATS_SAMPLE_LIMIT,
            "outputFields": ["file_name", "mime_type"],
        });
        let sampled = self.post_json("/v2/vectordb/entities/query", query_body).await.unwrap_or_else(|_| json!({ "data": [] }));
        let rows: Vec<Value> = sampled.get("data").and_then(Value::as_array).cloned().unwrap_or_default();

        let mut file_names: Vec<String> = rows.iter().filter_map(|r| r.get("file_name").and_then(Value::as_str)).map(str::to_owned).collect();
        file_names.sort();
        file_names.dedup();
        let mut mime_types: Vec<String> = rows.iter().filter_map(|r| r.get("mime_type").and_then(Value::as_str)).map(str::to_owned).collect();
        mime_types.sort();
        mime_types.dedup();

        Ok(CollectionStats {
            name: name.to_owned(),
            row_count,
            file_names,
            mime_types,
        })
    }

    fn backend_name(&self) -> &str {
        "milvus"
    }
}
