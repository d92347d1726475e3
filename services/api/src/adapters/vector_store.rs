//! services/api/src/adapters/vector_store.rs
//!
//! This module contains the adapter for the external vector collection.
//! It implements the `VectorStore` port from the `core` crate, speaking the
//! JSON document API of the hosted store over HTTP: documents carry an `_id`,
//! a `text` field, and a `$vector`, and nearest-neighbor search is a `find`
//! sorted by `$vector`.

use async_trait::async_trait;
use serde_json::{json, Value};

use doc_chat_core::domain::{ChunkRecord, RetrievedChunk, EMBEDDING_DIM};
use doc_chat_core::ports::{PortError, PortResult, VectorStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A vector collection adapter backed by a Data-API-style document store.
#[derive(Clone)]
pub struct DataApiVectorStore {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    collection: String,
}

impl DataApiVectorStore {
    /// Creates a new `DataApiVectorStore`.
    pub fn new(endpoint: String, token: String, collection: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            collection,
        }
    }

    fn keyspace_url(&self) -> String {
        format!("{}/api/json/v1/default_keyspace", self.endpoint)
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.keyspace_url(), self.collection)
    }

    /// Sends one command document to the given URL and returns the parsed body.
    async fn command(&self, url: &str, body: Value) -> PortResult<Value> {
        let response = self
            .http
            .post(url)
            .header("Token", &self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Vector store request failed: {}", e)))?;

        let status = response.status();
        let parsed: Value = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Vector store response unreadable: {}", e)))?;

        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "Vector store returned {}: {}",
                status, parsed
            )));
        }
        if let Some(errors) = parsed.get("errors") {
            return Err(PortError::Unexpected(format!(
                "Vector store command failed: {}",
                errors
            )));
        }

        Ok(parsed)
    }

    /// Creates the collection if it does not already exist. The dimension and
    /// metric are fixed for the lifetime of the collection.
    pub async fn ensure_collection(&self) -> PortResult<()> {
        let body = json!({
            "createCollection": {
                "name": self.collection,
                "options": {
                    "vector": { "dimension": EMBEDDING_DIM, "metric": "cosine" }
                }
            }
        });
        self.command(&self.keyspace_url(), body).await?;
        tracing::info!(collection = %self.collection, "Vector collection ready");
        Ok(())
    }
}

/// Extracts retrieved chunks from a `find` response body.
fn parse_find_response(body: &Value) -> Vec<RetrievedChunk> {
    let documents = body
        .pointer("/data/documents")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    documents
        .iter()
        .map(|doc| RetrievedChunk {
            id: doc
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            text: doc.get("text").and_then(Value::as_str).map(str::to_string),
        })
        .collect()
}

//=========================================================================================
// `VectorStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl VectorStore for DataApiVectorStore {
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> PortResult<()> {
        let documents: Vec<Value> = chunks
            .iter()
            .map(|chunk| {
                json!({
                    "_id": chunk.id,
                    "text": chunk.text,
                    "$vector": chunk.vector,
                })
            })
            .collect();

        let body = json!({ "insertMany": { "documents": documents } });
        self.command(&self.collection_url(), body).await?;
        Ok(())
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> PortResult<Vec<RetrievedChunk>> {
        let body = json!({
            "find": {
                "sort": { "$vector": vector },
                "options": { "limit": limit },
                "projection": { "text": 1 }
            }
        });
        let response = self.command(&self.collection_url(), body).await?;
        Ok(parse_find_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documents_from_find_response() {
        let body = json!({
            "data": {
                "documents": [
                    { "_id": "a", "text": "first chunk" },
                    { "_id": "b" }
                ]
            }
        });

        let chunks = parse_find_response(&body);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, "a");
        assert_eq!(chunks[0].text.as_deref(), Some("first chunk"));
        assert_eq!(chunks[1].id, "b");
        assert!(chunks[1].text.is_none());
    }

    #[test]
    fn empty_response_yields_no_chunks() {
        assert!(parse_find_response(&json!({ "data": { "documents": [] } })).is_empty());
        assert!(parse_find_response(&json!({ "status": { "ok": 1 } })).is_empty());
    }
}
