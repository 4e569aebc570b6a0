//! Token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use chateo_core::Identity;
use chateo_core::config::AuthConfig;

use super::claims::Claims;
use crate::error::AuthError;

/// Turns a presented credential into a verified identity.
pub trait IdentityVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify `token`. `None` or an empty string is `AuthError::Missing`.
    fn verify(&self, token: Option<&str>) -> Result<Identity, AuthError>;
}

/// Validates HS256 tokens signed with the shared secret.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        // Tokens from the authenticator may omit `exp`; it is checked when present.
        if !config.require_expiry {
            validation.required_spec_claims.clear();
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string into its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AuthError::Invalid("token has expired".into())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AuthError::Invalid("malformed token".into())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::Invalid("bad signature".into())
                    }
                    jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(claim) => {
                        AuthError::Invalid(format!("missing claim '{claim}'"))
                    }
                    _ => AuthError::Invalid(format!("validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

impl IdentityVerifier for JwtDecoder {
    fn verify(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(AuthError::Missing);
        };

        let claims = self.decode(token)?;
        if claims.user_id.is_blank() {
            return Err(AuthError::Invalid("empty userId".into()));
        }
        debug!(identity = %claims.user_id, "Token verified");
        Ok(claims.user_id)
    }
}
