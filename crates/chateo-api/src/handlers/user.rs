//! Presence lookup.

use axum::Json;
use axum::extract::{Path, State};

use chateo_core::{AppError, Identity};

use crate::dto::response::UserStatusResponse;
use crate::state::AppState;

/// GET /api/users/{identity}/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<UserStatusResponse>, AppError> {
    let identity = Identity::new(identity);
    let profile = state
        .profiles
        .find_profile(&identity)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{identity}' not found")))?;

    Ok(Json(UserStatusResponse {
        user_id: profile.identity,
        status: profile.status,
        last_seen: profile.last_seen,
    }))
}
