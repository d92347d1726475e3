pub mod domain;
pub mod ports;

pub use domain::{
    ChatEntry, ChatSession, ChunkRecord, PdfDocument, RetrievedChunk, User, UserCredentials,
    EMBEDDING_DIM,
};
pub use ports::{
    DatabaseService, EmbeddingService, GenerativeService, PortError, PortResult,
    TitleGenerationService, VectorStore,
};
