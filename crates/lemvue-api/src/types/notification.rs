// ── Inbox notifications ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NotificationKind;
use super::ids::NotificationId;
use super::modlog::ModlogEntry;
use super::views::{CommentView, PostView, PrivateMessageView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationEntry {
    Known(NotificationItem),
    Unrecognized(UnrecognizedNotification),
}

impl NotificationEntry {
    pub fn id(&self) -> NotificationId {
        match self {
            Self::Known(item) => item.id,
            Self::Unrecognized(raw) => raw.id,
        }
    }

    pub fn read(&self) -> bool {
        match self {
            Self::Known(item) => item.read,
            Self::Unrecognized(raw) => raw.read,
        }
    }

    /// Copy of this entry with the read flag replaced.
    pub fn with_read(&self, read: bool) -> Self {
        match self {
            Self::Known(item) => Self::Known(NotificationItem {
                read,
                ..item.clone()
            }),
            Self::Unrecognized(raw) => Self::Unrecognized(UnrecognizedNotification {
                read,
                ..raw.clone()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: NotificationId,
    pub published: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(flatten)]
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrecognizedNotification {
    pub id: NotificationId,
    pub published: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(rename = "type_")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type_")]
pub enum NotificationData {
    /// Someone replied to the user's post or comment.
    Reply { comment: Box<CommentView> },
    /// The user was mentioned in a comment.
    Mention { comment: Box<CommentView> },
    /// New activity on a post the user subscribed to.
    Subscription { post: Box<PostView> },
    PrivateMessage { message: Box<PrivateMessageView> },
    /// A moderator acted on the user's content or account.
    ModAction { entry: Box<ModlogEntry> },
}

impl NotificationData {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Reply { .. } => NotificationKind::Reply,
            Self::Mention { .. } => NotificationKind::Mention,
            Self::Subscription { .. } => NotificationKind::Subscription,
            Self::PrivateMessage { .. } => NotificationKind::PrivateMessage,
            Self::ModAction { .. } => NotificationKind::ModAction,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_notification_kind_keeps_identity_and_read_flag() {
        let entry: NotificationEntry = serde_json::from_value(json!({
            "id": 4,
            "published": "2025-03-01T12:00:00Z",
            "read": true,
            "type_": "Poke"
        }))
        .unwrap();

        assert_eq!(entry.id(), NotificationId(4));
        assert!(entry.read());
        assert!(matches!(entry, NotificationEntry::Unrecognized(_)));
        assert!(!entry.with_read(false).read());
    }
}
