// ── Core error types ──
//
// User-facing errors from lemvue-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<lemvue_api::Error>`
// impl translates transport-layer errors into domain variants, and
// `RequestError` is the compact form stored in `RequestState::Failed`.

use std::fmt;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach instance at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {what}")]
    NotFound { what: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by instance: {code}")]
    Rejected {
        /// Machine-readable code, e.g. `couldnt_find_post`, `site_ban`.
        code: String,
        message: Option<String>,
    },

    #[error("Not signed in")]
    NotLoggedIn,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Unexpected response from instance: {message}")]
    Decode { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lemvue_api::Error> for CoreError {
    fn from(err: lemvue_api::Error) -> Self {
        if err.is_not_found() {
            let what = match err {
                lemvue_api::Error::Api { code, message, .. } => message.unwrap_or(code),
                lemvue_api::Error::Http { preview, .. } => preview,
                other => other.to_string(),
            };
            return CoreError::NotFound { what };
        }
        match err {
            lemvue_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            lemvue_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lemvue_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            lemvue_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "session expired or invalid credentials".into(),
            },
            lemvue_api::Error::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            lemvue_api::Error::Api { code, message, .. } => CoreError::Rejected { code, message },
            lemvue_api::Error::Http { status, preview } => CoreError::Api {
                message: preview,
                status: Some(status),
            },
            lemvue_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}

// ── RequestError ─────────────────────────────────────────────────────

/// Machine-readable failure category carried by `RequestState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Timeout,
    Unauthorized,
    RateLimited,
    NotFound,
    Decode,
    /// Domain rejection with the instance's error code.
    Api(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("network"),
            Self::Timeout => f.write_str("timeout"),
            Self::Unauthorized => f.write_str("unauthorized"),
            Self::RateLimited => f.write_str("rate_limited"),
            Self::NotFound => f.write_str("not_found"),
            Self::Decode => f.write_str("decode"),
            Self::Api(code) => f.write_str(code),
        }
    }
}

/// A failed request as views see it: a kind to branch on plus an optional
/// human message from the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

impl RequestError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Text suitable for an inline error line or a toast.
    pub fn user_message(&self) -> String {
        let base = match &self.kind {
            ErrorKind::Network => "Could not reach the instance",
            ErrorKind::Timeout => "The instance took too long to respond",
            ErrorKind::Unauthorized => "You need to log in again",
            ErrorKind::RateLimited => "Slow down -- too many requests",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Decode => "The instance sent something unexpected",
            ErrorKind::Api(code) => return api_code_message(code, self.message.as_deref()),
        };
        match &self.message {
            Some(detail) if !detail.is_empty() => format!("{base}: {detail}"),
            _ => base.to_owned(),
        }
    }
}

fn api_code_message(code: &str, detail: Option<&str>) -> String {
    let known = match code {
        "not_a_moderator" => Some("You are not a moderator here"),
        "not_an_admin" => Some("Only admins can do that"),
        "site_ban" => Some("You are banned from this site"),
        "banned_from_community" => Some("You are banned from this community"),
        "locked" => Some("This thread is locked"),
        "deleted" => Some("This was deleted"),
        "couldnt_update_post" => Some("Could not update the post"),
        "couldnt_update_comment" => Some("Could not update the comment"),
        "couldnt_create_comment" => Some("Could not create the comment"),
        "registration_application_answer_required" => Some("An application answer is required"),
        "oauth_authorization_invalid" => Some("The login provider rejected the request"),
        _ => None,
    };
    match (known, detail) {
        (Some(text), _) => text.to_owned(),
        (None, Some(detail)) if !detail.is_empty() => detail.to_owned(),
        (None, _) => code.replace('_', " "),
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}: {m}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<CoreError> for RequestError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason, .. } => {
                Self::with_message(ErrorKind::Network, reason)
            }
            CoreError::AuthenticationFailed { message } => {
                Self::with_message(ErrorKind::Unauthorized, message)
            }
            CoreError::NotLoggedIn => Self::new(ErrorKind::Unauthorized),
            CoreError::Timeout { .. } => Self::new(ErrorKind::Timeout),
            CoreError::RateLimited { .. } => Self::new(ErrorKind::RateLimited),
            CoreError::NotFound { what } => Self::with_message(ErrorKind::NotFound, what),
            CoreError::Rejected { code, message } => Self {
                kind: ErrorKind::Api(code),
                message,
            },
            CoreError::Decode { message } => Self::with_message(ErrorKind::Decode, message),
            CoreError::Api { message, .. } => Self::with_message(ErrorKind::Network, message),
            CoreError::Config { message } | CoreError::Internal(message) => {
                Self::with_message(ErrorKind::Api("internal".into()), message)
            }
        }
    }
}

impl From<lemvue_api::Error> for RequestError {
    fn from(err: lemvue_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn couldnt_find_codes_become_not_found() {
        let err: CoreError = lemvue_api::Error::Api {
            code: "couldnt_find_post".into(),
            message: None,
            status: 400,
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(RequestError::from(err).kind, ErrorKind::NotFound);
    }

    #[test]
    fn bare_404_becomes_not_found_with_its_preview() {
        let err: CoreError = lemvue_api::Error::Http {
            status: 404,
            preview: "no such page".into(),
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { ref what } if what == "no such page"));

        let err: CoreError = lemvue_api::Error::Http {
            status: 502,
            preview: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(502), .. }));
    }

    #[test]
    fn domain_rejection_keeps_code() {
        let err = RequestError::from(lemvue_api::Error::Api {
            code: "site_ban".into(),
            message: None,
            status: 400,
        });
        assert_eq!(err.kind, ErrorKind::Api("site_ban".into()));
        assert_eq!(err.user_message(), "You are banned from this site");
    }

    #[test]
    fn unknown_code_falls_back_to_readable_text() {
        let err = RequestError::new(ErrorKind::Api("email_not_verified".into()));
        assert_eq!(err.user_message(), "email not verified");
    }

    #[test]
    fn unauthorized_maps_to_unauthorized_kind() {
        let err = RequestError::from(lemvue_api::Error::Unauthorized);
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
