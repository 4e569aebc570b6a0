//! Presence domain entities.

use serde::{Deserialize, Serialize};

/// Online/offline status persisted on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// At least one live connection.
    Online,
    /// No live connections.
    #[default]
    Offline,
}

impl PresenceStatus {
    /// Check if the user is considered online.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = chateo_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(chateo_core::AppError::validation(format!(
                "Invalid presence status: '{s}'"
            ))),
        }
    }
}
