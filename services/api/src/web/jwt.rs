//! services/api/src/web/jwt.rs
//!
//! Bearer token issuance and validation. Tokens are HS256-signed with the
//! server secret, carry the user's email as subject, and expire after 30
//! minutes.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use doc_chat_core::ports::{PortError, PortResult};

/// Token lifetime.
const TOKEN_TTL_MINUTES: i64 = 30;

/// Claims carried by every access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

/// Holds the derived signing and verification keys.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Derives both keys from the shared server secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a fresh access token for the given subject email.
    pub fn issue(&self, email: &str) -> PortResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            exp: (now + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| PortError::Unexpected(format!("Failed to issue token: {}", e)))
    }

    /// Validates a bearer token and returns its claims. Expired or malformed
    /// tokens are rejected as unauthorized.
    pub fn validate(&self, token: &str) -> PortResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| PortError::Unauthorized)
    }
}
