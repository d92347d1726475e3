//! services/api/src/adapters/embedding.rs
//!
//! This module contains the adapter for the embedding provider.
//! It implements the `EmbeddingService` port from the `core` crate by calling
//! the provider's embeddings endpoint directly.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use doc_chat_core::domain::EMBEDDING_DIM;
use doc_chat_core::ports::{EmbeddingService, PortError, PortResult};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EmbeddingService` against the OpenAI
/// embeddings API.
///
/// Every request asks for exactly `EMBEDDING_DIM` dimensions so the vectors
/// match the collection created at startup.
#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiEmbeddingAdapter {
    /// Creates a new `OpenAiEmbeddingAdapter`.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

//=========================================================================================
// `EmbeddingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>> {
        let payload = json!({
            "input": text,
            "model": self.model,
            "dimensions": EMBEDDING_DIM,
        });

        let response = self
            .http
            .post(EMBEDDINGS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "Embedding provider returned {}",
                status
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Embedding response unreadable: {}", e)))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                PortError::Unexpected("Embedding response contained no vectors".to_string())
            })?;

        Ok(embedding)
    }
}
