// ── Source records ──
//
// Rows as the server stores them. Views (see `views.rs`) join these with
// per-viewer state such as votes, subscriptions, and bans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::ids::{
    CommentId, CommunityId, InstanceId, LocalUserId, MultiCommunityId, PersonId, PostId,
    PrivateMessageId, RegistrationApplicationId,
};
use super::{CommentSortType, ListingType, PostSortType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<Url>,
    /// Site-wide ban flag.
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub ban_expires: Option<DateTime<Utc>>,
    pub ap_id: Url,
    #[serde(default = "default_true")]
    pub local: bool,
    #[serde(default)]
    pub bot_account: bool,
    pub published: DateTime<Utc>,
}

impl Person {
    /// The name to show in lists: display name when set, otherwise the handle.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: LocalUserId,
    pub person_id: PersonId,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub default_post_sort_type: Option<PostSortType>,
    #[serde(default)]
    pub default_comment_sort_type: Option<CommentSortType>,
    #[serde(default)]
    pub default_listing_type: Option<ListingType>,
    #[serde(default)]
    pub show_read_posts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub nsfw: bool,
    pub ap_id: Url,
    #[serde(default = "default_true")]
    pub local: bool,
    #[serde(default)]
    pub subscribers: i64,
    #[serde(default)]
    pub posts: i64,
    pub published: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCommunity {
    pub id: MultiCommunityId,
    pub creator_id: PersonId,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub ap_id: Url,
    pub published: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub name: String,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub body: Option<String>,
    pub creator_id: PersonId,
    pub community_id: CommunityId,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub featured_community: bool,
    #[serde(default)]
    pub featured_local: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub comments: i64,
    pub ap_id: Url,
    pub published: DateTime<Utc>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub creator_id: PersonId,
    pub post_id: PostId,
    pub content: String,
    /// Materialized ancestry: `0.<root id>.<child id>...<own id>`.
    pub path: String,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub distinguished: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub child_count: i32,
    pub ap_id: Url,
    pub published: DateTime<Utc>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl Comment {
    /// Id of the direct parent, decoded from `path`. `None` for top-level comments.
    pub fn parent_id(&self) -> Option<CommentId> {
        let mut segments = self.path.split('.').rev();
        segments.next()?;
        segments
            .next()
            .and_then(|raw| raw.parse::<i32>().ok())
            .filter(|id| *id != 0)
            .map(CommentId)
    }

    /// Nesting depth; top-level comments are depth 0.
    pub fn depth(&self) -> usize {
        self.path.split('.').count().saturating_sub(2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateMessage {
    pub id: PrivateMessageId,
    pub creator_id: PersonId,
    pub recipient_id: PersonId,
    pub content: String,
    #[serde(default)]
    pub deleted: bool,
    pub published: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationApplication {
    pub id: RegistrationApplicationId,
    pub local_user_id: LocalUserId,
    pub answer: String,
    #[serde(default)]
    pub admin_id: Option<PersonId>,
    #[serde(default)]
    pub deny_reason: Option<String>,
    pub published: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub domain: String,
    #[serde(default)]
    pub software: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ap_id: Url,
    pub published: DateTime<Utc>,
}

/// Instance-wide settings relevant to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSite {
    #[serde(default)]
    pub default_post_listing_type: ListingType,
    #[serde(default)]
    pub default_post_sort_type: PostSortType,
    #[serde(default)]
    pub default_comment_sort_type: CommentSortType,
    #[serde(default)]
    pub private_instance: bool,
    #[serde(default)]
    pub registration_mode: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn comment_with_path(path: &str) -> Comment {
        serde_json::from_value(serde_json::json!({
            "id": 9,
            "creator_id": 1,
            "post_id": 1,
            "content": "hi",
            "path": path,
            "ap_id": "https://lemmy.test/comment/9",
            "published": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn top_level_comment_has_no_parent() {
        let c = comment_with_path("0.9");
        assert_eq!(c.parent_id(), None);
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn nested_comment_decodes_parent_and_depth() {
        let c = comment_with_path("0.3.5.9");
        assert_eq!(c.parent_id(), Some(CommentId(5)));
        assert_eq!(c.depth(), 2);
    }
}
