pub mod chat_llm;
pub mod db;
pub mod embedding;
pub mod title_llm;
pub mod vector_store;

pub use chat_llm::OpenAiChatAdapter;
pub use db::DbAdapter;
pub use embedding::OpenAiEmbeddingAdapter;
pub use title_llm::OpenAiTitleAdapter;
pub use vector_store::DataApiVectorStore;
