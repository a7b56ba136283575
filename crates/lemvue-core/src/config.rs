// ── Runtime connection configuration ──
//
// Describes how to reach one instance and who to sign in as. Built by the
// front end from config files and flags; core never reads files itself.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::params::DEFAULT_PAGE_SIZE;

/// How to authenticate with an instance.
#[derive(Debug, Clone, Default)]
pub enum AuthCredentials {
    /// Browse without an account.
    #[default]
    Anonymous,
    /// A session token from an earlier login.
    Jwt(SecretString),
    /// Username (or email) and password, exchanged for a token on connect.
    Password {
        username: String,
        password: SecretString,
        totp: Option<String>,
    },
}

/// Configuration for connecting to a single instance.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    /// Instance base URL (e.g. `https://lemmy.ml`).
    pub url: Url,
    pub auth: AuthCredentials,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Items per page for every list view.
    pub page_size: u32,
    /// Sent as the `User-Agent` header.
    pub user_agent: String,
}

impl InstanceConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            auth: AuthCredentials::Anonymous,
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: concat!("lemvue/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }

    pub fn with_auth(mut self, auth: AuthCredentials) -> Self {
        self.auth = auth;
        self
    }
}
