//! services/api/src/test_support.rs
//!
//! In-memory mock implementations of the core ports, shared by the unit tests
//! of the ingestion and chat pipelines.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use doc_chat_core::domain::{
    ChatEntry, ChatSession, ChunkRecord, PdfDocument, RetrievedChunk, User, UserCredentials,
};
use doc_chat_core::ports::{
    DatabaseService, EmbeddingService, GenerativeService, PortError, PortResult,
    TitleGenerationService, VectorStore,
};

//=========================================================================================
// Mock Database
//=========================================================================================

#[derive(Default)]
pub struct MockDb {
    users: Mutex<Vec<UserCredentials>>,
    pdfs: Mutex<Vec<PdfDocument>>,
    sessions: Mutex<Vec<ChatSession>>,
    history: Mutex<Vec<ChatEntry>>,
}

impl MockDb {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl DatabaseService for MockDb {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let user = UserCredentials {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(User {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_pdf(
        &self,
        user_id: Uuid,
        filename: &str,
        _content: &[u8],
    ) -> PortResult<PdfDocument> {
        let pdf = PdfDocument {
            id: Uuid::new_v4(),
            user_id,
            filename: filename.to_string(),
            upload_date: Utc::now(),
        };
        self.pdfs.lock().unwrap().push(pdf.clone());
        Ok(pdf)
    }

    async fn create_chat_session(&self, user_id: Uuid, title: &str) -> PortResult<ChatSession> {
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            created_at: Utc::now(),
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn latest_chat_session(&self, user_id: Uuid) -> PortResult<Option<ChatSession>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .last()
            .cloned())
    }

    async fn list_chat_sessions(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>> {
        let mut sessions: Vec<ChatSession> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.reverse();
        Ok(sessions)
    }

    async fn delete_chat_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| !(s.id == session_id && s.user_id == user_id));
        if sessions.len() == before {
            return Err(PortError::NotFound(format!(
                "Chat session {} not found",
                session_id
            )));
        }
        // Cascade to history, matching the relational schema.
        self.history
            .lock()
            .unwrap()
            .retain(|e| e.session_id != session_id);
        Ok(())
    }

    async fn update_session_title(&self, session_id: Uuid, title: &str) -> PortResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|s| s.id == session_id) {
            session.title = title.to_string();
        }
        Ok(())
    }

    async fn append_chat_entry(
        &self,
        session_id: Uuid,
        message: &str,
        response: &str,
    ) -> PortResult<ChatEntry> {
        let entry = ChatEntry {
            id: Uuid::new_v4(),
            session_id,
            message: message.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        };
        self.history.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn session_messages(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> PortResult<Vec<ChatEntry>> {
        let owned = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.id == session_id && s.user_id == user_id);
        if !owned {
            return Err(PortError::NotFound(format!(
                "Chat session {} not found",
                session_id
            )));
        }
        Ok(self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn list_chat_history(&self, user_id: Uuid) -> PortResult<Vec<ChatEntry>> {
        let session_ids: Vec<Uuid> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id)
            .collect();
        let mut entries: Vec<ChatEntry> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|e| session_ids.contains(&e.session_id))
            .cloned()
            .collect();
        entries.reverse();
        Ok(entries)
    }

    async fn delete_chat_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let session_ids: Vec<Uuid> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id)
            .collect();
        let mut history = self.history.lock().unwrap();
        let before = history.len();
        history.retain(|e| !(e.id == entry_id && session_ids.contains(&e.session_id)));
        if history.len() == before {
            return Err(PortError::NotFound(format!(
                "Chat entry {} not found",
                entry_id
            )));
        }
        Ok(())
    }
}

//=========================================================================================
// Mock Embedder
//=========================================================================================

/// Returns a fixed unit-ish vector for any input.
#[derive(Default)]
pub struct MockEmbedder;

#[async_trait]
impl EmbeddingService for MockEmbedder {
    async fn embed(&self, _text: &str) -> PortResult<Vec<f32>> {
        Ok(vec![0.5; 8])
    }
}

//=========================================================================================
// Mock Vector Store
//=========================================================================================

/// Records inserted chunks and echoes them back in insertion order on search.
#[derive(Default)]
pub struct MockVectorStore {
    chunks: Mutex<Vec<ChunkRecord>>,
}

impl MockVectorStore {
    pub fn inserted(&self) -> Vec<ChunkRecord> {
        self.chunks.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> PortResult<()> {
        self.chunks.lock().unwrap().extend_from_slice(chunks);
        Ok(())
    }

    async fn similarity_search(
        &self,
        _vector: &[f32],
        limit: usize,
    ) -> PortResult<Vec<RetrievedChunk>> {
        Ok(self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .map(|c| RetrievedChunk {
                id: c.id.clone(),
                text: Some(c.text.clone()),
            })
            .collect())
    }
}

//=========================================================================================
// Mock LLMs
//=========================================================================================

/// Returns a canned response and remembers the last system instruction.
pub struct MockChatLlm {
    response: String,
    last_instruction: Mutex<Option<String>>,
}

impl MockChatLlm {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            last_instruction: Mutex::new(None),
        }
    }

    pub fn last_system_instruction(&self) -> Option<String> {
        self.last_instruction.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeService for MockChatLlm {
    async fn complete(&self, system_instruction: &str, _message: &str) -> PortResult<String> {
        *self.last_instruction.lock().unwrap() = Some(system_instruction.to_string());
        Ok(self.response.clone())
    }
}

/// Returns a canned title and counts how often it was asked.
pub struct MockTitleLlm {
    title: String,
    call_count: AtomicUsize,
}

impl MockTitleLlm {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TitleGenerationService for MockTitleLlm {
    async fn summarize_query(&self, _query: &str) -> PortResult<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.title.clone())
    }
}

//=========================================================================================
// Handler test harness
//=========================================================================================

/// Builds a full `AppState` wired over the mocks, for exercising the axum
/// handlers directly. Also hands back the `MockDb` so tests can seed and
/// inspect stored rows.
pub fn mock_app_state() -> (std::sync::Arc<crate::web::state::AppState>, std::sync::Arc<MockDb>) {
    use std::sync::Arc;

    use crate::chat::ChatService;
    use crate::ingest::IngestService;
    use crate::web::jwt::JwtKeys;
    use crate::web::state::AppState;

    let db = Arc::new(MockDb::default());
    let embedder = Arc::new(MockEmbedder);
    let vectors = Arc::new(MockVectorStore::default());

    let ingest = Arc::new(IngestService::new(
        db.clone(),
        embedder.clone(),
        vectors.clone(),
    ));
    let chat = Arc::new(ChatService::new(
        db.clone(),
        embedder,
        vectors,
        Arc::new(MockChatLlm::new("A grounded answer.")),
        Arc::new(MockTitleLlm::new("Photosynthesis Basics")),
    ));

    let state = Arc::new(AppState {
        db: db.clone(),
        jwt: Arc::new(JwtKeys::new("unit-test-signing-key")),
        ingest,
        chat,
    });
    (state, db)
}
