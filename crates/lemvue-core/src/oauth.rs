// ── OAuth handshake state ──
//
// Before leaving for the provider the client stores who it asked, a
// random nonce, an expiry, and where to return. The callback must present
// the same nonce before the stored blob expires. The blob is consumed by
// the first validation attempt, successful or not.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use lemvue_api::endpoints::OAuthProvider;
use lemvue_api::types::OAuthProviderId;

use crate::error::CoreError;
use crate::storage::{SessionStorage, set_json};

pub const OAUTH_STATE_KEY: &str = "oauth_state";

/// How long the user has to finish the provider round trip.
pub const OAUTH_STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error("No OAuth login is in progress")]
    Missing,

    #[error("Stored OAuth state is unreadable")]
    Corrupt,

    #[error("OAuth state does not match this login attempt")]
    NonceMismatch,

    #[error("OAuth login expired, please try again")]
    Expired,

    #[error("OAuth provider {0} is not offered by this instance")]
    UnknownProvider(OAuthProviderId),
}

impl From<OAuthError> for CoreError {
    fn from(err: OAuthError) -> Self {
        CoreError::AuthenticationFailed {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    pub provider_id: OAuthProviderId,
    pub nonce: Uuid,
    pub expires_at: DateTime<Utc>,
    /// Local route to open after login.
    pub redirect: String,
}

impl OAuthState {
    /// Start a handshake and persist it. Non-local redirects are replaced
    /// with the front page.
    pub fn begin(
        storage: &dyn SessionStorage,
        provider_id: OAuthProviderId,
        redirect: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let state = Self {
            provider_id,
            nonce: Uuid::new_v4(),
            expires_at: now + TimeDelta::minutes(OAUTH_STATE_TTL_MINUTES),
            redirect: local_redirect(redirect),
        };
        set_json(storage, OAUTH_STATE_KEY, &state);
        debug!(provider = %provider_id, "oauth handshake started");
        state
    }

    /// Provider authorization URL carrying this state's nonce.
    pub fn authorization_url(&self, provider: &OAuthProvider, redirect_uri: &Url) -> Url {
        let mut url = provider.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &provider.client_id)
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("scope", &provider.scopes)
            .append_pair("state", &self.nonce.to_string());
        url
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Check a callback's `state` parameter against the stored handshake.
pub fn validate(
    storage: &dyn SessionStorage,
    callback_state: &str,
    now: DateTime<Utc>,
) -> Result<OAuthState, OAuthError> {
    let raw = storage.remove(OAUTH_STATE_KEY).ok_or(OAuthError::Missing)?;
    let state: OAuthState = serde_json::from_value(raw).map_err(|e| {
        warn!(error = %e, "discarding unreadable oauth state");
        OAuthError::Corrupt
    })?;
    let presented = Uuid::parse_str(callback_state).map_err(|_| OAuthError::NonceMismatch)?;
    if presented != state.nonce {
        return Err(OAuthError::NonceMismatch);
    }
    if state.is_expired(now) {
        return Err(OAuthError::Expired);
    }
    Ok(state)
}

fn local_redirect(raw: &str) -> String {
    if raw.starts_with('/') && !raw.starts_with("//") {
        raw.to_owned()
    } else {
        "/".to_owned()
    }
}
