// Instance API HTTP client
//
// Wraps `reqwest::Client` with `/api/v4/` URL construction, bearer-token
// injection, and error-body decoding. Endpoint modules only declare data
// types; every call funnels through `call`.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use crate::endpoint::{Endpoint, HttpMethod};
use crate::endpoints::account::{Login, LoginResponse};
use crate::error::Error;
use crate::transport::TransportConfig;

const API_PREFIX: &str = "api/v4/";
const PREVIEW_CHARS: usize = 200;

/// Rejection body the instance returns alongside non-2xx statuses.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// Raw HTTP client for a single instance.
///
/// Holds the (optional) session token behind an `ArcSwapOption` so a login
/// on one task is visible to every clone of the surrounding `Arc` without
/// locking on the request path.
pub struct LemmyClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
    jwt: ArcSwapOption<SecretString>,
}

impl LemmyClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the instance root, e.g. `https://lemmy.example`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url);
        client.timeout = Some(transport.timeout);
        Ok(client)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            timeout: None,
            jwt: ArcSwapOption::empty(),
        }
    }

    /// The instance root URL (always ends in `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session token ────────────────────────────────────────────────

    pub fn set_jwt(&self, jwt: SecretString) {
        debug!("storing session token");
        self.jwt.store(Some(Arc::new(jwt)));
    }

    pub fn clear_jwt(&self) {
        self.jwt.store(None);
    }

    pub fn is_authenticated(&self) -> bool {
        self.jwt.load().is_some()
    }

    /// Password login. On success the returned token is also installed on
    /// this client.
    pub async fn login(
        &self,
        username_or_email: &str,
        password: &SecretString,
        totp: Option<&str>,
    ) -> Result<LoginResponse, Error> {
        let req = Login {
            username_or_email: username_or_email.to_owned(),
            password: password.expose_secret().to_owned(),
            totp_2fa_token: totp.map(str::to_owned),
        };
        let resp = self.call(&req).await?;
        if let Some(jwt) = &resp.jwt {
            self.set_jwt(jwt.clone().into());
        }
        debug!("login successful");
        Ok(resp)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Full URL for an API path: `{base}/api/v4/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(API_PREFIX)?.join(path)?)
    }

    // ── Request dispatch ─────────────────────────────────────────────

    /// Perform one endpoint call and decode its response.
    pub async fn call<E: Endpoint>(&self, req: &E) -> Result<E::Response, Error> {
        let url = self.api_url(E::PATH)?;

        let builder = match E::METHOD {
            HttpMethod::Get => {
                debug!("GET {} ({})", url, E::NAME);
                self.http.get(url).query(req)
            }
            HttpMethod::Post => {
                debug!("POST {} ({})", url, E::NAME);
                self.http.post(url).json(req)
            }
            HttpMethod::Put => {
                debug!("PUT {} ({})", url, E::NAME);
                self.http.put(url).json(req)
            }
        };

        let builder = match self.jwt.load_full() {
            Some(jwt) => builder.bearer_auth(jwt.expose_secret()),
            None => builder,
        };

        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;
        self.parse_response(resp).await
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        match (err.is_timeout(), self.timeout) {
            (true, Some(timeout)) => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(5);
            return Err(Error::RateLimited { retry_after_secs });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            if let Ok(api) = serde_json::from_str::<ApiErrorBody>(&body) {
                // An expired token arrives as a 400 with this code.
                if api.error == "not_logged_in" {
                    return Err(Error::Unauthorized);
                }
                return Err(Error::Api {
                    code: api.error,
                    message: api.message,
                    status: status.as_u16(),
                });
            }
            return Err(Error::Http {
                status: status.as_u16(),
                preview: preview(&body),
            });
        }

        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// `Url::join` drops the last segment unless the base ends in `/`.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = Url::parse("https://lemmy.example/sub").unwrap();
        let client = LemmyClient::with_client(reqwest::Client::new(), url);
        assert_eq!(client.base_url().as_str(), "https://lemmy.example/sub/");
        assert_eq!(
            client.api_url("post/list").unwrap().as_str(),
            "https://lemmy.example/sub/api/v4/post/list"
        );
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), PREVIEW_CHARS);
    }
}
