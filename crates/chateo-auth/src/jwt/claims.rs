//! Claims carried by the tokens the external authenticator issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chateo_core::Identity;

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The authenticated identity.
    pub user_id: Identity,
    /// Given name, if the issuer included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name, if the issuer included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration timestamp (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Claims for `identity` with no names and no timestamps.
    pub fn for_identity(identity: impl Into<Identity>) -> Self {
        Self {
            user_id: identity.into(),
            first_name: None,
            last_name: None,
            iat: None,
            exp: None,
        }
    }

    /// Returns the expiration as a `DateTime<Utc>`, if present.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the token carries an `exp` that has passed.
    pub fn is_expired(&self) -> bool {
        self.exp.is_some_and(|exp| Utc::now().timestamp() >= exp)
    }
}
