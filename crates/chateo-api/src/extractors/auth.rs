//! `AuthIdentity` extractor: pulls the token from the Authorization header and verifies it.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use chateo_core::{AppError, Identity};

use crate::state::AppState;

/// The verified caller of an HTTP route.
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub Identity);

impl std::ops::Deref for AuthIdentity {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

impl FromRequestParts<AppState> for AuthIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = state.verifier.verify(bearer_token(&parts.headers))?;
        Ok(AuthIdentity(identity))
    }
}
