//! OAuth2 client-credentials token management.
//!
//! The Lakeshore API authenticates every data-plane request with a bearer
//! token obtained from `/oauth/v2/token`. [`TokenManager`] owns the mutable
//! credential slot: it hands out the cached token while it is valid and
//! refreshes it on demand. Concurrent refreshes are coalesced behind a
//! single-flight gate, so a burst of expired callers produces one token
//! request, not one per caller.
//!
//! The reported token lifetime is reduced by a fixed safety margin before it
//! is converted to an absolute expiry, so the client stops using a token
//! shortly before the server would start rejecting it.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::Error;

/// Seconds subtracted from the reported token lifetime.
const EXPIRY_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// The decoded response from the token endpoint.
///
/// Unknown fields (`token_type`, future additions) are ignored.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// A bearer token with its absolute expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    bearer: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Acquires and refreshes the bearer credential for a [`crate::Client`].
#[derive(Debug)]
pub(crate) struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    /// The credential slot. Readers attach the token to outbound requests;
    /// the only writer is the refresh path.
    slot: RwLock<Option<CachedToken>>,
    /// Held for the duration of a refresh. Callers that lose the race wait
    /// here and then re-read the slot.
    refresh_gate: Mutex<()>,
}

impl TokenManager {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: format!("{base_url}/oauth/v2/token"),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            slot: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Return a currently-valid bearer token, refreshing if needed.
    pub(crate) async fn ensure_valid(&self) -> Result<String, Error> {
        if let Some(token) = self.cached().await {
            trace!(expires_at = ?token.expires_at, "using cached bearer token");
            return Ok(token.bearer);
        }

        let _gate = self.refresh_gate.lock().await;

        // Another caller may have completed a refresh while we waited for
        // the gate.
        if let Some(token) = self.cached().await {
            return Ok(token.bearer);
        }

        let token = self.refresh().await?;
        let bearer = token.bearer.clone();
        *self.slot.write().await = Some(token);
        Ok(bearer)
    }

    /// Drop the cached token so the next request triggers a refresh.
    ///
    /// Called by the retry layer when the server rejects a token the local
    /// expiry still considers valid.
    pub(crate) async fn invalidate(&self) {
        debug!("clearing cached bearer token");
        self.slot.write().await.take();
    }

    async fn cached(&self) -> Option<CachedToken> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_valid())
            .cloned()
    }

    async fn refresh(&self) -> Result<CachedToken, Error> {
        debug!(url = %self.token_url, "requesting new bearer token");

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenAcquisition {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in)
            .saturating_sub(EXPIRY_SAFETY_MARGIN);
        let expires_at = Instant::now() + lifetime;
        debug!(expires_at = ?expires_at, "stored new bearer token");

        Ok(CachedToken {
            bearer: token.access_token,
            expires_at,
        })
    }
}
