// ── Union projection ──
//
// Modlog entries and notifications are closed sum types. Each variant is
// projected onto one uniform row shape so list views never match on kinds
// themselves. The matches below are exhaustive: a new wire variant does
// not compile until it gets a row.

use chrono::{DateTime, Utc};

use lemvue_api::types::{
    Community, ModlogAction, ModlogEntry, ModlogId, ModlogItem, NotificationData,
    NotificationEntry, NotificationId, NotificationItem, Person, Post,
};

use crate::params::Query;
use crate::route::{Route, RouteKind};

/// Longest excerpt of user text shown in a row.
const EXCERPT_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderBody {
    pub text: String,
    pub reason: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Where activating the row navigates.
    pub target: Option<Route>,
}

impl RenderBody {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reason: None,
            expires_at: None,
            target: None,
        }
    }

    fn reason(mut self, reason: Option<&String>) -> Self {
        self.reason = reason.filter(|r| !r.trim().is_empty()).cloned();
        self
    }

    fn expires(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = at;
        self
    }

    fn target(mut self, route: Route) -> Self {
        self.target = Some(route);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection<Id> {
    pub id: Id,
    pub acting_user: Option<String>,
    pub published_at: DateTime<Utc>,
    pub body: RenderBody,
    /// `false` for kinds this client does not know.
    pub recognized: bool,
}

pub trait Project {
    type Id;

    fn project(&self) -> Projection<Self::Id>;
}

pub fn unrecognized_text(kind: &str) -> String {
    format!("Unrecognized event ({kind})")
}

// ── Helpers ──────────────────────────────────────────────────────────

fn user(p: &Person) -> String {
    if p.local {
        format!("@{}", p.name)
    } else {
        match p.ap_id.host_str() {
            Some(host) => format!("@{}@{host}", p.name),
            None => format!("@{}", p.name),
        }
    }
}

fn community(c: &Community) -> String {
    format!("!{}", c.name)
}

fn post_route(post: &Post) -> Route {
    Route::new(RouteKind::Post(post.id))
}

fn comment_route(post: &Post, comment: lemvue_api::types::CommentId) -> Route {
    let mut query = Query::new();
    query.set("comment", comment.to_string());
    Route::with_query(RouteKind::Post(post.id), query)
}

fn community_route(c: &Community) -> Route {
    Route::new(RouteKind::Community(c.name.clone()))
}

fn excerpt(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() > EXCERPT_CHARS {
        let cut: String = line.chars().take(EXCERPT_CHARS).collect();
        format!("{cut}…")
    } else {
        line.to_owned()
    }
}

fn verb(on: bool, yes: &'static str, no: &'static str) -> &'static str {
    if on { yes } else { no }
}

// ── Modlog ───────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
fn modlog_body(action: &ModlogAction) -> RenderBody {
    match action {
        ModlogAction::ModRemovePost {
            post,
            community: c,
            removed,
            reason,
            ..
        } => RenderBody::text(format!(
            "{} post \"{}\" in {}",
            verb(*removed, "Removed", "Restored"),
            post.name,
            community(c)
        ))
        .reason(reason.as_ref())
        .target(post_route(post)),
        ModlogAction::ModLockPost {
            post,
            community: c,
            locked,
            reason,
            ..
        } => RenderBody::text(format!(
            "{} post \"{}\" in {}",
            verb(*locked, "Locked", "Unlocked"),
            post.name,
            community(c)
        ))
        .reason(reason.as_ref())
        .target(post_route(post)),
        ModlogAction::ModFeaturePost {
            post,
            community: c,
            featured,
            is_featured_community,
            ..
        } => {
            let place = if *is_featured_community {
                format!("in {}", community(c))
            } else {
                "on the front page".to_owned()
            };
            RenderBody::text(format!(
                "{} post \"{}\" {place}",
                verb(*featured, "Featured", "Unfeatured"),
                post.name
            ))
            .target(post_route(post))
        }
        ModlogAction::ModRemoveComment {
            comment,
            post,
            other_person,
            removed,
            reason,
            ..
        } => RenderBody::text(format!(
            "{} comment by {} on \"{}\"",
            verb(*removed, "Removed", "Restored"),
            user(other_person),
            post.name
        ))
        .reason(reason.as_ref())
        .target(comment_route(post, comment.id)),
        ModlogAction::ModLockComment {
            comment,
            post,
            other_person,
            locked,
            reason,
            ..
        } => RenderBody::text(format!(
            "{} comment by {} on \"{}\"",
            verb(*locked, "Locked", "Unlocked"),
            user(other_person),
            post.name
        ))
        .reason(reason.as_ref())
        .target(comment_route(post, comment.id)),
        ModlogAction::ModRemoveCommunity {
            community: c,
            removed,
            reason,
        } => RenderBody::text(format!(
            "{} community {}",
            verb(*removed, "Removed", "Restored"),
            community(c)
        ))
        .reason(reason.as_ref())
        .target(community_route(c)),
        ModlogAction::ModBanFromCommunity {
            community: c,
            other_person,
            banned,
            reason,
            expires_at,
        } => RenderBody::text(format!(
            "{} {} from {}",
            verb(*banned, "Banned", "Unbanned"),
            user(other_person),
            community(c)
        ))
        .reason(reason.as_ref())
        .expires(*expires_at)
        .target(community_route(c)),
        ModlogAction::ModAddCommunity {
            community: c,
            other_person,
            removed,
        } => RenderBody::text(format!(
            "{} {} as moderator of {}",
            verb(*removed, "Removed", "Appointed"),
            user(other_person),
            community(c)
        ))
        .target(community_route(c)),
        ModlogAction::ModTransferCommunity {
            community: c,
            other_person,
        } => RenderBody::text(format!(
            "Transferred {} to {}",
            community(c),
            user(other_person)
        ))
        .target(community_route(c)),
        ModlogAction::ModAdd {
            other_person,
            removed,
        } => RenderBody::text(format!(
            "{} {} as admin",
            verb(*removed, "Removed", "Appointed"),
            user(other_person)
        )),
        ModlogAction::ModBan {
            other_person,
            banned,
            reason,
            expires_at,
        } => RenderBody::text(format!(
            "{} {} from the site",
            verb(*banned, "Banned", "Unbanned"),
            user(other_person)
        ))
        .reason(reason.as_ref())
        .expires(*expires_at),
        ModlogAction::ModChangeCommunityVisibility {
            community: c,
            visibility,
        } => RenderBody::text(format!(
            "Changed visibility of {} to {visibility}",
            community(c)
        ))
        .target(community_route(c)),
        ModlogAction::AdminPurgePerson { reason } => {
            RenderBody::text("Purged a person").reason(reason.as_ref())
        }
        ModlogAction::AdminPurgeCommunity { reason } => {
            RenderBody::text("Purged a community").reason(reason.as_ref())
        }
        ModlogAction::AdminPurgePost {
            community: c,
            reason,
        } => RenderBody::text(format!("Purged a post from {}", community(c)))
            .reason(reason.as_ref())
            .target(community_route(c)),
        ModlogAction::AdminPurgeComment { post, reason } => {
            RenderBody::text(format!("Purged a comment from \"{}\"", post.name))
                .reason(reason.as_ref())
                .target(post_route(post))
        }
        ModlogAction::AdminBlockInstance {
            instance,
            blocked,
            reason,
            expires_at,
        } => RenderBody::text(format!(
            "{} instance {}",
            verb(*blocked, "Blocked", "Unblocked"),
            instance.domain
        ))
        .reason(reason.as_ref())
        .expires(*expires_at),
        ModlogAction::AdminAllowInstance {
            instance,
            allowed,
            reason,
        } => RenderBody::text(format!(
            "{} instance {}",
            verb(*allowed, "Allowed", "Disallowed"),
            instance.domain
        ))
        .reason(reason.as_ref()),
    }
}

impl Project for ModlogEntry {
    type Id = ModlogId;

    fn project(&self) -> Projection<ModlogId> {
        match self {
            ModlogEntry::Known(ModlogItem {
                id,
                published,
                moderator,
                action,
            }) => Projection {
                id: *id,
                acting_user: moderator.as_ref().map(user),
                published_at: *published,
                body: modlog_body(action),
                recognized: true,
            },
            ModlogEntry::Unrecognized(raw) => Projection {
                id: raw.id,
                acting_user: None,
                published_at: raw.published,
                body: RenderBody::text(unrecognized_text(&raw.kind)),
                recognized: false,
            },
        }
    }
}

// ── Notifications ────────────────────────────────────────────────────

fn notification_row(data: &NotificationData) -> (Option<String>, RenderBody) {
    match data {
        NotificationData::Reply { comment } => (
            Some(user(&comment.creator)),
            RenderBody::text(format!("replied: {}", excerpt(&comment.comment.content)))
                .target(comment_route(&comment.post, comment.comment.id)),
        ),
        NotificationData::Mention { comment } => (
            Some(user(&comment.creator)),
            RenderBody::text(format!(
                "mentioned you: {}",
                excerpt(&comment.comment.content)
            ))
            .target(comment_route(&comment.post, comment.comment.id)),
        ),
        NotificationData::Subscription { post } => (
            Some(user(&post.creator)),
            RenderBody::text(format!(
                "New activity on \"{}\" in {}",
                post.post.name,
                community(&post.community)
            ))
            .target(post_route(&post.post)),
        ),
        NotificationData::PrivateMessage { message } => (
            Some(user(&message.creator)),
            RenderBody::text(format!(
                "sent you a message: {}",
                excerpt(&message.private_message.content)
            )),
        ),
        NotificationData::ModAction { entry } => {
            let inner = entry.project();
            (inner.acting_user, inner.body)
        }
    }
}

impl Project for NotificationEntry {
    type Id = NotificationId;

    fn project(&self) -> Projection<NotificationId> {
        match self {
            NotificationEntry::Known(NotificationItem {
                id,
                published,
                data,
                ..
            }) => {
                let (acting_user, body) = notification_row(data);
                Projection {
                    id: *id,
                    acting_user,
                    published_at: *published,
                    body,
                    recognized: true,
                }
            }
            NotificationEntry::Unrecognized(raw) => Projection {
                id: raw.id,
                acting_user: None,
                published_at: raw.published,
                body: RenderBody::text(unrecognized_text(&raw.kind)),
                recognized: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::tree::tests::comment;

    fn person(id: i32, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "local": true,
            "ap_id": format!("https://lemmy.test/u/{name}"),
            "published": "2024-01-01T00:00:00Z"
        })
    }

    fn community() -> Value {
        json!({
            "id": 3,
            "name": "rust",
            "title": "Rust",
            "ap_id": "https://lemmy.test/c/rust",
            "published": "2024-01-01T00:00:00Z"
        })
    }

    fn post() -> Value {
        json!({
            "id": 9,
            "name": "Hello",
            "creator_id": 2,
            "community_id": 3,
            "ap_id": "https://lemmy.test/post/9",
            "published": "2025-01-01T00:00:00Z"
        })
    }

    fn comment_source() -> Value {
        serde_json::to_value(comment(4, "0.4", 2).comment).unwrap()
    }

    fn instance() -> Value {
        json!({ "id": 1, "domain": "spam.example" })
    }

    /// One payload for every known modlog kind.
    fn every_modlog_kind() -> Vec<Value> {
        let p = person(2, "bob");
        vec![
            json!({"type_": "ModRemovePost", "post": post(), "community": community(), "other_person": p, "removed": true, "reason": "spam"}),
            json!({"type_": "ModLockPost", "post": post(), "community": community(), "other_person": p, "locked": true}),
            json!({"type_": "ModFeaturePost", "post": post(), "community": community(), "other_person": p, "featured": true, "is_featured_community": true}),
            json!({"type_": "ModRemoveComment", "comment": comment_source(), "post": post(), "community": community(), "other_person": p, "removed": false}),
            json!({"type_": "ModLockComment", "comment": comment_source(), "post": post(), "community": community(), "other_person": p, "locked": true}),
            json!({"type_": "ModRemoveCommunity", "community": community(), "removed": true}),
            json!({"type_": "ModBanFromCommunity", "community": community(), "other_person": p, "banned": true, "expires_at": "2025-02-01T00:00:00Z"}),
            json!({"type_": "ModAddCommunity", "community": community(), "other_person": p, "removed": false}),
            json!({"type_": "ModTransferCommunity", "community": community(), "other_person": p}),
            json!({"type_": "ModAdd", "other_person": p, "removed": false}),
            json!({"type_": "ModBan", "other_person": p, "banned": true}),
            json!({"type_": "ModChangeCommunityVisibility", "community": community(), "visibility": "LocalOnly"}),
            json!({"type_": "AdminPurgePerson"}),
            json!({"type_": "AdminPurgeCommunity", "reason": "abuse"}),
            json!({"type_": "AdminPurgePost", "community": community()}),
            json!({"type_": "AdminPurgeComment", "post": post()}),
            json!({"type_": "AdminBlockInstance", "instance": instance(), "blocked": true}),
            json!({"type_": "AdminAllowInstance", "instance": instance(), "allowed": false}),
        ]
    }

    fn entry(id: i32, mut payload: Value) -> ModlogEntry {
        let obj = payload.as_object_mut().unwrap();
        obj.insert("id".into(), json!(id));
        obj.insert("published".into(), json!("2025-01-10T00:00:00Z"));
        obj.insert("moderator".into(), person(1, "alice"));
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn every_modlog_kind_projects_as_recognized() {
        let payloads = every_modlog_kind();
        assert_eq!(payloads.len(), 18);
        for (idx, payload) in payloads.into_iter().enumerate() {
            let id = i32::try_from(idx).unwrap() + 1;
            let row = entry(id, payload).project();
            assert!(row.recognized, "kind #{id} fell back");
            assert_eq!(row.id, ModlogId(id));
            assert_eq!(row.acting_user.as_deref(), Some("@alice"));
            assert!(!row.body.text.is_empty());
            assert!(!row.body.text.starts_with("Unrecognized"));
        }
    }

    #[test]
    fn modlog_rows_carry_reason_and_target() {
        let row = entry(1, every_modlog_kind().remove(0)).project();
        assert_eq!(row.body.text, "Removed post \"Hello\" in !rust");
        assert_eq!(row.body.reason.as_deref(), Some("spam"));
        assert_eq!(row.body.target.unwrap().to_string(), "/post/9");
    }

    #[test]
    fn unknown_modlog_kind_gets_placeholder() {
        let raw: ModlogEntry = serde_json::from_value(json!({
            "id": 77,
            "published": "2025-01-10T00:00:00Z",
            "type_": "ModRewriteHistory"
        }))
        .unwrap();
        let row = raw.project();
        assert!(!row.recognized);
        assert_eq!(row.id, ModlogId(77));
        assert_eq!(row.body.text, "Unrecognized event (ModRewriteHistory)");
        assert_eq!(row.acting_user, None);
    }

    #[test]
    fn reply_notification_links_to_comment() {
        let n: NotificationEntry = serde_json::from_value(json!({
            "id": 5,
            "published": "2025-01-10T00:00:00Z",
            "type_": "Reply",
            "comment": serde_json::to_value(comment(12, "0.12", 7)).unwrap()
        }))
        .unwrap();
        let row = n.project();
        assert!(row.recognized);
        assert_eq!(row.acting_user.as_deref(), Some("@user7"));
        assert_eq!(row.body.text, "replied: comment 12");
        assert_eq!(row.body.target.unwrap().to_string(), "/post/1?comment=12");
    }

    #[test]
    fn mod_action_notification_reuses_modlog_row() {
        let inner = entry(3, every_modlog_kind().remove(10));
        let n: NotificationEntry = serde_json::from_value(json!({
            "id": 6,
            "published": "2025-01-11T00:00:00Z",
            "type_": "ModAction",
            "entry": serde_json::to_value(&inner).unwrap()
        }))
        .unwrap();
        let row = n.project();
        assert_eq!(row.id, NotificationId(6));
        assert_eq!(row.body, inner.project().body);
    }

    #[test]
    fn unknown_notification_kind_gets_placeholder() {
        let n: NotificationEntry = serde_json::from_value(json!({
            "id": 8,
            "published": "2025-01-10T00:00:00Z",
            "type_": "Poke"
        }))
        .unwrap();
        let row = n.project();
        assert!(!row.recognized);
        assert_eq!(row.body.text, unrecognized_text("Poke"));
    }

    #[test]
    fn long_text_is_cut() {
        let long = "x".repeat(200);
        assert_eq!(excerpt(&long).chars().count(), EXCERPT_CHARS + 1);
        assert_eq!(excerpt("first\nsecond"), "first");
    }
}
