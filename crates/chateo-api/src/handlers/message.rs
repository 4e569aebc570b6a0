//! Conversation history.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use chateo_core::{AppError, Identity};

use crate::dto::request::HistoryQuery;
use crate::dto::response::ConversationResponse;
use crate::extractors::AuthIdentity;
use crate::state::AppState;

/// GET /api/messages/{peer}?limit=
pub async fn conversation(
    State(state): State<AppState>,
    caller: AuthIdentity,
    Path(peer): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ConversationResponse>, AppError> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let peer = Identity::new(peer);
    let messages = state
        .messages
        .conversation(&caller, &peer, query.effective_limit())
        .await?;

    Ok(Json(ConversationResponse {
        peer_id: peer,
        messages,
    }))
}
