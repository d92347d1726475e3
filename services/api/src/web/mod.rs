pub mod auth;
pub mod jwt;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::{
    chat_handler, create_session_handler, delete_history_handler, delete_session_handler,
    list_history_handler, list_sessions_handler, session_messages_handler, upload_pdf_handler,
};
