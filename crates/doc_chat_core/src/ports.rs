//! crates/doc_chat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ChatEntry, ChatSession, ChunkRecord, PdfDocument, RetrievedChunk, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>>;

    // --- PDF Management ---
    async fn create_pdf(
        &self,
        user_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> PortResult<PdfDocument>;

    // --- Chat Session Management ---
    async fn create_chat_session(&self, user_id: Uuid, title: &str) -> PortResult<ChatSession>;

    /// Returns the most recently created session for the user, if any.
    async fn latest_chat_session(&self, user_id: Uuid) -> PortResult<Option<ChatSession>>;

    /// Lists the user's sessions, newest first.
    async fn list_chat_sessions(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>>;

    /// Deletes a session owned by the user. History rows cascade.
    async fn delete_chat_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()>;

    async fn update_session_title(&self, session_id: Uuid, title: &str) -> PortResult<()>;

    // --- Chat History Management ---
    async fn append_chat_entry(
        &self,
        session_id: Uuid,
        message: &str,
        response: &str,
    ) -> PortResult<ChatEntry>;

    /// Lists a session's messages oldest-first, scoped to the owning user.
    async fn session_messages(&self, user_id: Uuid, session_id: Uuid) -> PortResult<Vec<ChatEntry>>;

    /// Lists all of a user's history rows newest-first, across sessions.
    async fn list_chat_history(&self, user_id: Uuid) -> PortResult<Vec<ChatEntry>>;

    /// Deletes a single history row owned by the user.
    async fn delete_chat_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Computes a fixed-dimension embedding vector for the given text.
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>>;
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk-inserts chunk records into the collection.
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> PortResult<()>;

    /// Nearest-neighbor search by cosine similarity, best matches first.
    async fn similarity_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> PortResult<Vec<RetrievedChunk>>;
}

#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Produces a model response for the message under the given system
    /// instruction, with a fresh (empty) prior-turn history.
    async fn complete(&self, system_instruction: &str, message: &str) -> PortResult<String>;
}

#[async_trait]
pub trait TitleGenerationService: Send + Sync {
    /// Summarizes a user query into a short (5-7 word) session title.
    async fn summarize_query(&self, query: &str) -> PortResult<String>;
}
