//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so a partial file is valid.

pub mod app;
pub mod auth;
pub mod logging;
pub mod realtime;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::store::{DatabaseConfig, StoreConfig, StoreProvider};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for `default.toml`, the
/// environment overlay, and `CHATEO__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Profile/message store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Credential verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files in `dir`.
    ///
    /// Merges `{dir}/default.toml` with `{dir}/{env}.toml` and environment
    /// variables prefixed with `CHATEO__` (e.g. `CHATEO__SERVER__PORT`).
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHATEO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_source() {
        let cfg: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.store.provider, StoreProvider::Postgres);
        assert_eq!(cfg.realtime.max_connections_per_user, 0);
        assert!(!cfg.auth.require_expiry);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [store]
            provider = "memory"
            seed_identities = ["alice", "bob"]

            [realtime]
            max_message_length = 16
        "#;
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.store.provider, StoreProvider::Memory);
        assert_eq!(cfg.store.seed_identities, vec!["alice", "bob"]);
        assert_eq!(cfg.realtime.max_message_length, 16);
        assert_eq!(cfg.realtime.connection_buffer_size, 256);
    }
}
