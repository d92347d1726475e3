//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::chat::ChatService;
use crate::ingest::IngestService;
use crate::web::jwt::JwtKeys;
use doc_chat_core::ports::DatabaseService;

/// The shared application state, created once at startup and passed to all
/// handlers. Everything here is a long-lived handle safe for concurrent use.
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub jwt: Arc<JwtKeys>,
    pub ingest: Arc<IngestService>,
    pub chat: Arc<ChatService>,
}
