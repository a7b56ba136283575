//! Everything that can happen in the app, as one enum.
//!
//! Key handlers, background fetches, and watchers all send [`Action`]s on
//! the same channel; the app loop drains it and routes each one.

use std::sync::Arc;

use lemvue_api::types::{CommentId, PostId, RegistrationApplicationId};
use lemvue_core::{Command, ConnectionState, Fetched, Mutation, Route, Unread};

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────
    Tick,
    Render,
    Resize(u16, u16),
    Quit,

    // ── Navigation ────────────────────────────────────────────────
    /// Push a new history entry.
    Navigate(Route),
    Back,
    Forward,
    /// Re-issue the failed or stale fetches of the active view.
    Retry,

    // ── Data ──────────────────────────────────────────────────────
    Fetched(Box<Fetched>),
    Execute(Command),
    /// A write succeeded; every screen folds it in.
    Mutated(Arc<Mutation>),
    UnreadChanged(Unread),
    ConnectionChanged(ConnectionState),

    // ── Sign-in ───────────────────────────────────────────────────
    BeginOAuth,
    SignOut,
    /// The local route to continue at, or a message for the user.
    OAuthFinished(Result<String, String>),

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    OpenPrompt(Prompt),
    ClosePrompt,
    SubmitPrompt(Prompt, String),
    Notify(Notification),
    DismissNotification,
}

/// What a line of typed input is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Jump to any route (`/c/rust?sort=New`).
    GoTo,
    Reply {
        post_id: PostId,
        parent_id: Option<CommentId>,
    },
    DenyReason {
        id: RegistrationApplicationId,
    },
    /// Paste the URL the OAuth provider redirected to.
    OAuthCallback {
        authorize_url: String,
    },
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Self::GoTo => " Go to ",
            Self::Reply {
                parent_id: None, ..
            } => " Comment ",
            Self::Reply { .. } => " Reply ",
            Self::DenyReason { .. } => " Deny reason ",
            Self::OAuthCallback { .. } => " Paste callback URL ",
        }
    }

    /// Whether an empty submission still means something.
    pub fn allows_empty(&self) -> bool {
        matches!(self, Self::DenyReason { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}
