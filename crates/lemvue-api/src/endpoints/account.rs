use std::fmt;

use serde::{Deserialize, Serialize};

use crate::endpoint::endpoints;
use crate::types::{MyUserInfo, OAuthProviderId, PersonId, PersonView, SiteView};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetSite {}

/// Public OAuth provider as advertised by the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthProvider {
    pub id: OAuthProviderId,
    pub display_name: String,
    pub authorization_endpoint: url::Url,
    pub client_id: String,
    #[serde(default)]
    pub scopes: String,
    #[serde(default)]
    pub use_pkce: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSiteResponse {
    pub site_view: SiteView,
    #[serde(default)]
    pub admins: Vec<PersonView>,
    pub version: String,
    #[serde(default)]
    pub oauth_providers: Vec<OAuthProvider>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMyUser {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetUnreadCounts {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCountsResponse {
    #[serde(default)]
    pub notification_count: i64,
    #[serde(default)]
    pub report_count: i64,
    #[serde(default)]
    pub registration_application_count: i64,
}

/// Password login. Build it through `LemmyClient::login` so the password
/// only ever leaves a `SecretString` at the serialization boundary.
#[derive(Clone, Serialize)]
pub struct Login {
    pub username_or_email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_2fa_token: Option<String>,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub jwt: Option<String>,
    #[serde(default)]
    pub registration_created: bool,
    #[serde(default)]
    pub verify_email_sent: bool,
}

/// Exchanges the provider's authorization code for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticateWithOauth {
    pub code: String,
    pub oauth_provider_id: OAuthProviderId,
    pub redirect_uri: url::Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPerson {
    pub person_id: PersonId,
    pub block: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPersonResponse {
    pub person_view: PersonView,
    pub blocked: bool,
}

endpoints! {
    GetSite => Get "site" -> GetSiteResponse;
    GetMyUser => Get "account" -> MyUserInfo;
    GetUnreadCounts => Get "account/unread_counts" -> UnreadCountsResponse;
    Login => Post "account/auth/login" -> LoginResponse;
    AuthenticateWithOauth => Post "oauth/authenticate" -> LoginResponse;
    BlockPerson => Post "account/block/person" -> BlockPersonResponse;
}
