//! services/api/src/ingest/mod.rs
//!
//! The document ingestion pipeline: persist the uploaded PDF, extract its
//! text, split it into overlapping chunks, embed each chunk, and bulk-insert
//! the results into the vector collection.

pub mod chunker;
pub mod pdf;

use std::sync::Arc;
use uuid::Uuid;

use doc_chat_core::domain::ChunkRecord;
use doc_chat_core::ports::{DatabaseService, EmbeddingService, PortError, PortResult, VectorStore};

/// The only file extension accepted for upload.
pub const SUPPORTED_EXTENSION: &str = ".pdf";

/// Returns true when the filename carries the recognized document extension.
/// Checked before any processing takes place.
pub fn is_supported_filename(filename: &str) -> bool {
    filename.ends_with(SUPPORTED_EXTENSION)
}

/// Orchestrates the ingestion pipeline over its injected ports.
pub struct IngestService {
    db: Arc<dyn DatabaseService>,
    embedder: Arc<dyn EmbeddingService>,
    vectors: Arc<dyn VectorStore>,
}

impl IngestService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        embedder: Arc<dyn EmbeddingService>,
        vectors: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            db,
            embedder,
            vectors,
        }
    }

    /// Ingests an uploaded PDF for the given user. Returns the number of
    /// chunks inserted into the vector collection.
    ///
    /// The PDF row is committed before extraction begins; there is no
    /// transactional linkage between the relational record and the vector
    /// inserts, and partial inserts are not rolled back.
    pub async fn ingest_pdf(
        &self,
        user_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> PortResult<usize> {
        let record = self.db.create_pdf(user_id, filename, content).await?;
        tracing::info!(pdf_id = %record.id, filename, "Stored uploaded PDF");

        let text = pdf::extract_text(content)?;
        self.ingest_text(&text).await
    }

    /// Chunks, embeds and inserts the extracted text. Chunks embed one at a
    /// time, sequentially, within the request.
    async fn ingest_text(&self, text: &str) -> PortResult<usize> {
        let chunks = chunker::split_text(text)?;
        if chunks.is_empty() {
            return Err(PortError::Validation(
                "No usable text content found in the document".to_string(),
            ));
        }

        let mut records = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self.embedder.embed(&chunk).await?;
            records.push(ChunkRecord {
                id: Uuid::new_v4().to_string(),
                text: chunk,
                vector,
            });
        }

        self.vectors.insert_chunks(&records).await?;
        tracing::info!(chunks = records.len(), "Chunks inserted into vector collection");

        Ok(records.len())
    }
}
