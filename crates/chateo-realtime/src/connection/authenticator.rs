//! WebSocket authentication. Validates the token presented at handshake and
//! requires the named identity to have a profile.

use std::sync::Arc;

use tracing::warn;

use chateo_auth::IdentityVerifier;
use chateo_core::{AppError, Identity};
use chateo_database::ProfileStore;

/// Authenticates WebSocket connections before any other component sees them.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// Credential verifier.
    verifier: Arc<dyn IdentityVerifier>,
    /// Profile lookup.
    profiles: Arc<dyn ProfileStore>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(verifier: Arc<dyn IdentityVerifier>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { verifier, profiles }
    }

    /// Verify the presented token and check the identity is registered.
    ///
    /// Store failures pass through unchanged so they are not reported as
    /// bad credentials.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, AppError> {
        let identity = self.verifier.verify(token).map_err(|e| {
            warn!(error = %e, "WebSocket authentication rejected");
            AppError::from(e)
        })?;

        if self.profiles.find_profile(&identity).await?.is_none() {
            warn!(%identity, "WebSocket token names an unregistered identity");
            return Err(AppError::authentication(format!(
                "No profile for '{identity}'"
            )));
        }

        Ok(identity)
    }
}
