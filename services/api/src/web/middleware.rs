//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::state::AppState;

/// Middleware that validates the bearer token and resolves it to a user.
///
/// If valid, inserts the domain `User` into request extensions for handlers
/// to use. If invalid, missing, or resolving to no known user, returns 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract the Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Strip the bearer scheme
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 3. Validate the token; the subject claim is the user's email
    let claims = state.jwt.validate(token).map_err(|e| {
        debug!(error = %e, "Token validation failed");
        StatusCode::UNAUTHORIZED
    })?;

    // 4. The subject must still resolve to an existing user
    let credentials = state
        .db
        .find_user_by_email(&claims.sub)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 5. Insert the user into request extensions
    req.extensions_mut().insert(doc_chat_core::domain::User {
        id: credentials.id,
        username: credentials.username,
        email: credentials.email,
    });

    // 6. Continue to the handler
    Ok(next.run(req).await)
}
