//! Credential verification configuration.

use serde::{Deserialize, Serialize};

/// Placeholder secret used when none is configured.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Settings for verifying the tokens issued by the external authenticator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC-SHA256 secret used to sign tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Reject tokens that carry no `exp` claim.
    #[serde(default)]
    pub require_expiry: bool,
    /// Clock skew tolerance in seconds when checking `exp`.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Lifetime of tokens minted by `JwtEncoder`, in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            require_expiry: false,
            leeway_seconds: default_leeway(),
            token_ttl_minutes: default_token_ttl(),
        }
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_leeway() -> u64 {
    5
}

fn default_token_ttl() -> u64 {
    60
}
