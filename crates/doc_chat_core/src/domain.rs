//! crates/doc_chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Dimension of every embedding vector in the collection. Fixed at
/// collection-creation time; the embedding adapter must request exactly this.
pub const EMBEDDING_DIM: usize = 768;

// Represents a user - used throughout the app.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

/// An uploaded PDF. The raw bytes are stored verbatim and never reprocessed
/// after ingestion.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub upload_date: DateTime<Utc>,
}

/// A chat session owned by one user. The title starts as a placeholder and is
/// overwritten exactly once by a generated summary on the first exchange.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// One query/response exchange within a session. Rows are append-only.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub id: Uuid,
    pub session_id: Uuid,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// A chunk of document text with its embedding, ready for insertion into the
/// vector collection. Immutable once inserted.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
}

/// A nearest-neighbor match returned by the vector collection. The text is
/// optional because the store does not guarantee the field's presence.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub id: String,
    pub text: Option<String>,
}
