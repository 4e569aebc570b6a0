//! Token minting for tests and tooling.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};

use chateo_core::config::AuthConfig;
use chateo_core::error::AppError;
use chateo_core::{AppResult, Identity};

use super::claims::Claims;

/// Creates HS256 tokens signed with the shared secret.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in minutes.
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: config.token_ttl_minutes as i64,
        }
    }

    /// Mints a token for `identity` expiring after the configured TTL.
    pub fn mint(&self, identity: &Identity) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            iat: Some(now.timestamp()),
            exp: Some((now + chrono::Duration::minutes(self.ttl_minutes)).timestamp()),
            ..Claims::for_identity(identity.clone())
        };
        self.encode(&claims)
    }

    /// Signs arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
