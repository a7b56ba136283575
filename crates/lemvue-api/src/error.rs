use thiserror::Error;

/// Top-level error type for the `lemvue-api` crate.
///
/// Covers every failure mode of a single RPC call: transport, HTTP status,
/// structured API rejections, and undecodable bodies. `lemvue-core` maps
/// these into user-facing request errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Authentication ──────────────────────────────────────────────
    /// The instance rejected (or did not receive) the bearer token.
    #[error("Not authorized -- log in again")]
    Unauthorized,

    // ── Instance responses ──────────────────────────────────────────
    /// Too many requests; `retry_after_secs` comes from `Retry-After` when present.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Structured rejection: `{"error": "<code>", "message": "..."}`.
    #[error("API error (HTTP {status}): {code}")]
    Api {
        code: String,
        message: Option<String>,
        status: u16,
    },

    /// Non-success status without a structured error body.
    #[error("HTTP {status}: {preview}")]
    Http { status: u16, preview: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } | Self::Api { status: 404, .. } => true,
            Self::Api { code, .. } => code.starts_with("couldnt_find"),
            _ => false,
        }
    }
}
