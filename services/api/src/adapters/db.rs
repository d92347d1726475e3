//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use doc_chat_core::domain::{ChatEntry, ChatSession, PdfDocument, User, UserCredentials};
use doc_chat_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    hashed_password: String,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
        }
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            username: self.username,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct PdfRecord {
    id: Uuid,
    user_id: Uuid,
    filename: String,
    upload_date: DateTime<Utc>,
}

impl PdfRecord {
    fn to_domain(self) -> PdfDocument {
        PdfDocument {
            id: self.id,
            user_id: self.user_id,
            filename: self.filename,
            upload_date: self.upload_date,
        }
    }
}

#[derive(FromRow)]
struct ChatSessionRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
}

impl ChatSessionRecord {
    fn to_domain(self) -> ChatSession {
        ChatSession {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ChatEntryRecord {
    id: Uuid,
    session_id: Uuid,
    message: String,
    response: String,
    timestamp: DateTime<Utc>,
}

impl ChatEntryRecord {
    fn to_domain(self) -> ChatEntry {
        ChatEntry {
            id: self.id,
            session_id: self.session_id,
            message: self.message,
            response: self.response,
            timestamp: self.timestamp,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, username, email, hashed_password) VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, hashed_password",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_credentials))
    }

    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, hashed_password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_credentials))
    }

    async fn create_pdf(
        &self,
        user_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> PortResult<PdfDocument> {
        let record = sqlx::query_as::<_, PdfRecord>(
            "INSERT INTO pdfs (id, user_id, filename, content) VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, filename, upload_date",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(filename)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn create_chat_session(&self, user_id: Uuid, title: &str) -> PortResult<ChatSession> {
        let record = sqlx::query_as::<_, ChatSessionRecord>(
            "INSERT INTO chat_sessions (id, user_id, title) VALUES ($1, $2, $3) \
             RETURNING id, user_id, title, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn latest_chat_session(&self, user_id: Uuid) -> PortResult<Option<ChatSession>> {
        let record = sqlx::query_as::<_, ChatSessionRecord>(
            "SELECT id, user_id, title, created_at FROM chat_sessions \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(ChatSessionRecord::to_domain))
    }

    async fn list_chat_sessions(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>> {
        let records = sqlx::query_as::<_, ChatSessionRecord>(
            "SELECT id, user_id, title, created_at FROM chat_sessions \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(ChatSessionRecord::to_domain).collect())
    }

    async fn delete_chat_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Chat session {} not found",
                session_id
            )));
        }
        Ok(())
    }

    async fn update_session_title(&self, session_id: Uuid, title: &str) -> PortResult<()> {
        sqlx::query("UPDATE chat_sessions SET title = $1 WHERE id = $2")
            .bind(title)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn append_chat_entry(
        &self,
        session_id: Uuid,
        message: &str,
        response: &str,
    ) -> PortResult<ChatEntry> {
        let record = sqlx::query_as::<_, ChatEntryRecord>(
            "INSERT INTO chat_history (id, session_id, message, response) VALUES ($1, $2, $3, $4) \
             RETURNING id, session_id, message, response, timestamp",
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(message)
        .bind(response)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn session_messages(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> PortResult<Vec<ChatEntry>> {
        // Ownership check first so an unowned session 404s instead of listing empty.
        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_sessions WHERE id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        if owned == 0 {
            return Err(PortError::NotFound(format!(
                "Chat session {} not found",
                session_id
            )));
        }

        let records = sqlx::query_as::<_, ChatEntryRecord>(
            "SELECT id, session_id, message, response, timestamp FROM chat_history \
             WHERE session_id = $1 ORDER BY timestamp ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(ChatEntryRecord::to_domain).collect())
    }

    async fn list_chat_history(&self, user_id: Uuid) -> PortResult<Vec<ChatEntry>> {
        let records = sqlx::query_as::<_, ChatEntryRecord>(
            "SELECT ch.id, ch.session_id, ch.message, ch.response, ch.timestamp \
             FROM chat_history ch \
             JOIN chat_sessions cs ON cs.id = ch.session_id \
             WHERE cs.user_id = $1 ORDER BY ch.timestamp DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(ChatEntryRecord::to_domain).collect())
    }

    async fn delete_chat_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let result = sqlx::query(
            "DELETE FROM chat_history ch USING chat_sessions cs \
             WHERE ch.session_id = cs.id AND ch.id = $1 AND cs.user_id = $2",
        )
        .bind(entry_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Chat entry {} not found",
                entry_id
            )));
        }
        Ok(())
    }
}
