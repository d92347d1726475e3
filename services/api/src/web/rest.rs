//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};
use uuid::Uuid;

use crate::chat::SESSION_TITLE_PLACEHOLDER;
use crate::error::ApiError;
use crate::ingest::is_supported_filename;
use crate::web::auth::{LoginRequest, SignupRequest, TokenResponse};
use crate::web::state::AppState;
use doc_chat_core::domain::{ChatEntry, ChatSession, User};
use doc_chat_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        upload_pdf_handler,
        create_session_handler,
        list_sessions_handler,
        delete_session_handler,
        session_messages_handler,
        chat_handler,
        list_history_handler,
        delete_history_handler,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            TokenResponse,
            MessageResponse,
            SessionResponse,
            ChatEntryResponse,
            ChatRequest,
            ChatResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "PDF Chat API", description = "Retrieval-augmented chat over uploaded PDFs.")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by the protected endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatSession> for SessionResponse {
    fn from(session: ChatSession) -> Self {
        Self {
            id: session.id,
            title: session.title,
            created_at: session.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatEntryResponse {
    pub id: Uuid,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatEntry> for ChatEntryResponse {
    fn from(entry: ChatEntry) -> Self {
        Self {
            id: entry.id,
            message: entry.message,
            response: entry.response,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: Uuid,
    pub session_title: String,
}

//=========================================================================================
// Upload
//=========================================================================================

/// Upload a PDF and ingest it into the vector collection.
#[utoipa::path(
    post,
    path = "/upload-pdf",
    request_body(content_type = "multipart/form-data", description = "The PDF to upload."),
    responses(
        (status = 200, description = "PDF ingested", body = MessageResponse),
        (status = 400, description = "Not a PDF, or no usable text content"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Processing failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_pdf_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read multipart data: {}", e)))?
        .ok_or_else(|| {
            ApiError::from(PortError::Validation(
                "Multipart form must include a file".to_string(),
            ))
        })?;

    let filename = field.file_name().unwrap_or_default().to_string();
    if !is_supported_filename(&filename) {
        return Err(PortError::Validation("Only PDF files are accepted".to_string()).into());
    }

    let content = field
        .bytes()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read file bytes: {}", e)))?;

    let chunk_count = state.ingest.ingest_pdf(user.id, &filename, &content).await?;
    Ok(Json(MessageResponse {
        message: format!("{} chunks ingested into the vector collection", chunk_count),
    }))
}

//=========================================================================================
// Chat Sessions
//=========================================================================================

/// Create a new chat session with the placeholder title.
#[utoipa::path(
    post,
    path = "/chat-sessions",
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .db
        .create_chat_session(user.id, SESSION_TITLE_PLACEHOLDER)
        .await?;
    Ok(Json(SessionResponse::from(session)))
}

/// List the user's chat sessions, newest first.
#[utoipa::path(
    get,
    path = "/chat-sessions",
    responses(
        (status = 200, description = "Sessions, newest first", body = [SessionResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state.db.list_chat_sessions(user.id).await?;
    let response: Vec<SessionResponse> = sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(response))
}

/// Delete a chat session (and, by cascade, its history).
#[utoipa::path(
    delete,
    path = "/chat-sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session deleted", body = MessageResponse),
        (status = 404, description = "Session not found or not owned"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_chat_session(user.id, id).await?;
    Ok(Json(MessageResponse {
        message: "Chat session deleted".to_string(),
    }))
}

/// List a session's messages, oldest first.
#[utoipa::path(
    get,
    path = "/chat-sessions/{id}/messages",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Messages, oldest first", body = [ChatEntryResponse]),
        (status = 404, description = "Session not found or not owned"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn session_messages_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.db.session_messages(user.id, id).await?;
    let response: Vec<ChatEntryResponse> =
        entries.into_iter().map(ChatEntryResponse::from).collect();
    Ok(Json(response))
}

//=========================================================================================
// Chat
//=========================================================================================

/// Run one retrieval-augmented chat turn against the active session.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model response", body = ChatResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Processing failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let turn = state.chat.chat_turn(user.id, &req.query).await?;
    Ok(Json(ChatResponse {
        response: turn.response,
        session_id: turn.session_id,
        session_title: turn.session_title,
    }))
}

//=========================================================================================
// Chat History
//=========================================================================================

/// List all of the user's chat history, newest first.
#[utoipa::path(
    get,
    path = "/chat-history",
    responses(
        (status = 200, description = "History, newest first", body = [ChatEntryResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.db.list_chat_history(user.id).await?;
    let response: Vec<ChatEntryResponse> =
        entries.into_iter().map(ChatEntryResponse::from).collect();
    Ok(Json(response))
}

/// Delete a single chat-history row.
#[utoipa::path(
    delete,
    path = "/chat-history/{id}",
    params(("id" = Uuid, Path, description = "History row id")),
    responses(
        (status = 200, description = "Entry deleted", body = MessageResponse),
        (status = 404, description = "Entry not found or not owned"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_chat_entry(user.id, id).await?;
    Ok(Json(MessageResponse {
        message: "Chat entry deleted".to_string(),
    }))
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_app_state;
    use doc_chat_core::ports::DatabaseService;

    #[tokio::test]
    async fn deleting_a_session_cascades_history_and_later_fetches_404() {
        let (state, db) = mock_app_state();
        let user = db
            .create_user("deniz", "deniz@example.com", "hash")
            .await
            .unwrap();
        let session = db
            .create_chat_session(user.id, SESSION_TITLE_PLACEHOLDER)
            .await
            .unwrap();
        db.append_chat_entry(session.id, "question", "answer")
            .await
            .unwrap();

        delete_session_handler(State(state.clone()), Extension(user.clone()), Path(session.id))
            .await
            .unwrap();

        let result =
            session_messages_handler(State(state), Extension(user.clone()), Path(session.id))
                .await;
        assert!(matches!(result, Err(ApiError::Port(PortError::NotFound(_)))));
        assert!(db.list_chat_history(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_another_users_session_is_not_found() {
        let (state, db) = mock_app_state();
        let owner = db
            .create_user("owner", "owner@example.com", "hash")
            .await
            .unwrap();
        let intruder = db
            .create_user("intruder", "intruder@example.com", "hash")
            .await
            .unwrap();
        let session = db
            .create_chat_session(owner.id, SESSION_TITLE_PLACEHOLDER)
            .await
            .unwrap();

        let result =
            delete_session_handler(State(state), Extension(intruder), Path(session.id)).await;
        assert!(matches!(result, Err(ApiError::Port(PortError::NotFound(_)))));
        assert_eq!(db.list_chat_sessions(owner.id).await.unwrap().len(), 1);
    }
}
