//! Query-string DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default page size for conversation history.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
/// Hard cap on conversation history page size.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// `GET /ws` query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WsQuery {
    /// Credential token.
    pub token: Option<String>,
}

/// `GET /api/messages/{peer}` query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct HistoryQuery {
    /// Number of most recent messages (default 100, capped at 500).
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// Effective limit after defaulting and capping.
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT)
    }
}
