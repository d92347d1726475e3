//! services/api/src/chat.rs
//!
//! The retrieval-augmented chat flow: resolve the active session, embed the
//! query, fetch nearest-neighbor chunks, assemble the prompt, invoke the
//! generative model, persist the exchange, and derive a session title on the
//! first turn.

use std::sync::Arc;
use uuid::Uuid;

use doc_chat_core::domain::RetrievedChunk;
use doc_chat_core::ports::{
    DatabaseService, EmbeddingService, GenerativeService, PortResult, TitleGenerationService,
    VectorStore,
};

/// Title given to sessions created without a first message. Overwritten by a
/// generated summary on the first exchange.
pub const SESSION_TITLE_PLACEHOLDER: &str = "New Chat";

/// Number of nearest neighbors requested from the vector collection.
const RETRIEVAL_TOP_K: usize = 10;

/// Maximum length of a query-derived session title before truncation.
const TITLE_PREFIX_LEN: usize = 50;

/// Context block used when the collection returns no matches at all.
const NO_CONTEXT_FALLBACK: &str = "No relevant context found in the database.";

/// Substituted for an individual retrieval result that carries no text field.
const MISSING_TEXT_FALLBACK: &str = "No text available";

const ASSISTANT_PERSONA: &str = "You are a specialized artificial intelligence assistant. \
    Your task is to answer the user's question based on the provided context. \
    If the answer is not found in the context, use your own trained knowledge to respond.";

/// The outcome of one chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub response: String,
    pub session_id: Uuid,
    pub session_title: String,
}

//=========================================================================================
// Prompt Assembly Helpers
//=========================================================================================

/// Derives the title of a lazily-created session from its first query,
/// truncated with an ellipsis marker when longer than the prefix length.
pub fn title_for_query(query: &str) -> String {
    if query.chars().count() > TITLE_PREFIX_LEN {
        let prefix: String = query.chars().take(TITLE_PREFIX_LEN).collect();
        format!("{}...", prefix)
    } else {
        query.to_string()
    }
}

/// Concatenates retrieved chunk texts into the context block. Results missing
/// their text field contribute a per-result placeholder; an empty result set
/// collapses to the fixed no-context sentence.
fn build_context(results: &[RetrievedChunk]) -> String {
    if results.is_empty() {
        return NO_CONTEXT_FALLBACK.to_string();
    }

    let mut context = String::new();
    for result in results {
        context.push_str(result.text.as_deref().unwrap_or(MISSING_TEXT_FALLBACK));
        context.push('\n');
    }
    context
}

fn build_system_instruction(context: &str, query: &str) -> String {
    format!(
        "{}\n\nContext: {}\n\nQuestion: {}",
        ASSISTANT_PERSONA, context, query
    )
}

//=========================================================================================
// The Chat Service
//=========================================================================================

/// Orchestrates the retrieval-augmented chat flow over its injected ports.
pub struct ChatService {
    db: Arc<dyn DatabaseService>,
    embedder: Arc<dyn EmbeddingService>,
    vectors: Arc<dyn VectorStore>,
    chat_llm: Arc<dyn GenerativeService>,
    title_llm: Arc<dyn TitleGenerationService>,
}

impl ChatService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        embedder: Arc<dyn EmbeddingService>,
        vectors: Arc<dyn VectorStore>,
        chat_llm: Arc<dyn GenerativeService>,
        title_llm: Arc<dyn TitleGenerationService>,
    ) -> Self {
        Self {
            db,
            embedder,
            vectors,
            chat_llm,
            title_llm,
        }
    }

    /// Runs one full chat turn for the user's free-text query.
    pub async fn chat_turn(&self, user_id: Uuid, query: &str) -> PortResult<ChatTurn> {
        // The active session is the most recently created one; a fresh user
        // gets a session titled with the (possibly truncated) query itself.
        let session = match self.db.latest_chat_session(user_id).await? {
            Some(session) => session,
            None => {
                self.db
                    .create_chat_session(user_id, &title_for_query(query))
                    .await?
            }
        };

        let query_vector = self.embedder.embed(query).await?;
        let results = self
            .vectors
            .similarity_search(&query_vector, RETRIEVAL_TOP_K)
            .await?;

        let context = build_context(&results);
        let system_instruction = build_system_instruction(&context, query);

        let response = self.chat_llm.complete(&system_instruction, query).await?;

        self.db
            .append_chat_entry(session.id, query, &response)
            .await?;

        // The placeholder title is replaced exactly once, on the session's
        // first exchange. Later turns leave the generated title alone.
        let session_title = if session.title == SESSION_TITLE_PLACEHOLDER {
            let title = self.title_llm.summarize_query(query).await?;
            let title = title.trim().to_string();
            self.db.update_session_title(session.id, &title).await?;
            title
        } else {
            session.title
        };

        Ok(ChatTurn {
            response,
            session_id: session.id,
            session_title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockChatLlm, MockDb, MockEmbedder, MockTitleLlm, MockVectorStore};
    use doc_chat_core::domain::ChunkRecord;

    fn chunk(id: &str, text: Option<&str>) -> RetrievedChunk {
        RetrievedChunk {
            id: id.to_string(),
            text: text.map(str::to_string),
        }
    }

    fn service(
        db: Arc<MockDb>,
        vectors: Arc<MockVectorStore>,
        title_llm: Arc<MockTitleLlm>,
    ) -> ChatService {
        ChatService::new(
            db,
            Arc::new(MockEmbedder::default()),
            vectors,
            Arc::new(MockChatLlm::new("a grounded answer")),
            title_llm,
        )
    }

    #[test]
    fn short_queries_title_verbatim() {
        assert_eq!(title_for_query("What is chunking?"), "What is chunking?");
    }

    #[test]
    fn long_queries_truncate_with_ellipsis() {
        let query = "x".repeat(80);
        let title = title_for_query(&query);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn empty_results_collapse_to_fixed_sentence() {
        assert_eq!(build_context(&[]), NO_CONTEXT_FALLBACK);
    }

    #[test]
    fn missing_text_results_use_per_result_placeholder() {
        let context = build_context(&[chunk("a", Some("alpha")), chunk("b", None)]);
        assert_eq!(context, "alpha\nNo text available\n");
    }

    #[test]
    fn system_instruction_embeds_context_and_query() {
        let instruction = build_system_instruction("some context", "some question");
        assert!(instruction.contains("Context: some context"));
        assert!(instruction.contains("Question: some question"));
    }

    #[tokio::test]
    async fn first_turn_creates_session_titled_with_query() {
        let db = Arc::new(MockDb::default());
        let title_llm = Arc::new(MockTitleLlm::new("Generated Title"));
        let service = service(db.clone(), Arc::new(MockVectorStore::default()), title_llm.clone());

        let user_id = Uuid::new_v4();
        let turn = service.chat_turn(user_id, "what is in my pdf?").await.unwrap();

        assert_eq!(turn.response, "a grounded answer");
        // The first-message title is the query itself, not the placeholder, so
        // no summary call happens for lazily-created sessions.
        assert_eq!(turn.session_title, "what is in my pdf?");
        assert_eq!(title_llm.calls(), 0);

        let history = db.list_chat_history(user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "what is in my pdf?");
        assert_eq!(history[0].response, "a grounded answer");
    }

    #[tokio::test]
    async fn placeholder_title_is_replaced_exactly_once() {
        let db = Arc::new(MockDb::default());
        let title_llm = Arc::new(MockTitleLlm::new("Short Query Summary"));
        let service = service(db.clone(), Arc::new(MockVectorStore::default()), title_llm.clone());

        let user_id = Uuid::new_v4();
        db.create_chat_session(user_id, SESSION_TITLE_PLACEHOLDER)
            .await
            .unwrap();

        let first = service.chat_turn(user_id, "first question").await.unwrap();
        assert_eq!(first.session_title, "Short Query Summary");
        assert_eq!(title_llm.calls(), 1);

        let second = service.chat_turn(user_id, "second question").await.unwrap();
        assert_eq!(second.session_id, first.session_id);
        assert_eq!(second.session_title, "Short Query Summary");
        assert_eq!(title_llm.calls(), 1, "title must not be regenerated");
    }

    #[tokio::test]
    async fn retrieved_chunks_flow_into_the_system_instruction() {
        let db = Arc::new(MockDb::default());
        let vectors = Arc::new(MockVectorStore::default());
        vectors
            .insert_chunks(&[ChunkRecord {
                id: "c1".to_string(),
                text: "the sky is blue".to_string(),
                vector: vec![0.5; 4],
            }])
            .await
            .unwrap();

        let chat_llm = Arc::new(MockChatLlm::new("answer"));
        let service = ChatService::new(
            db,
            Arc::new(MockEmbedder::default()),
            vectors,
            chat_llm.clone(),
            Arc::new(MockTitleLlm::new("t")),
        );

        service
            .chat_turn(Uuid::new_v4(), "what color is the sky?")
            .await
            .unwrap();

        let instruction = chat_llm.last_system_instruction().unwrap();
        assert!(instruction.contains("the sky is blue"));
        assert!(!instruction.contains(NO_CONTEXT_FALLBACK));
    }
}
