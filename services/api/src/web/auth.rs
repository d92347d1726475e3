//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup and login. Both issue a
//! time-limited bearer token on success.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;
use doc_chat_core::ports::PortError;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /signup - Create a new user account and issue a token
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created, token issued", body = TokenResponse),
        (status = 400, description = "Duplicate email or username"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Reject duplicate email or username before touching anything else
    if state.db.find_user_by_email(&req.email).await?.is_some() {
        return Err(PortError::Validation("Email already registered".to_string()).into());
    }
    if state.db.find_user_by_username(&req.username).await?.is_some() {
        return Err(PortError::Validation("Username already taken".to_string()).into());
    }

    // 2. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })?
        .to_string();

    // 3. Create the user row
    let user = state
        .db
        .create_user(&req.username, &req.email, &password_hash)
        .await?;

    // 4. Issue the bearer token, subject = email
    let token = state.jwt.issue(&user.email)?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// POST /login - Verify credentials and issue a token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, token issued", body = TokenResponse),
        (status = 400, description = "Incorrect email or password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let bad_credentials =
        || ApiError::from(PortError::Validation("Incorrect email or password".to_string()));

    // 1. Look up the user by email
    let credentials = state
        .db
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(bad_credentials)?;

    // 2. Verify the password against the stored hash
    let parsed_hash = PasswordHash::new(&credentials.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(bad_credentials());
    }

    // 3. Issue a token of identical form to signup
    let token = state.jwt.issue(&credentials.email)?;
    Ok(Json(TokenResponse::bearer(token)))
}

//=========================================================================================
// Tests
//=========================================================================================
