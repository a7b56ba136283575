// ── Mutations ──
//
// Every successful write produces exactly one `Mutation`. The front end
// broadcasts it to every live view, and each view folds it into its own
// slots through `Reconcile`. A view that does not hold the affected
// entity returns `None` and keeps its snapshot.

use std::sync::Arc;

use lemvue_api::types::{
    CommentView, CommunityId, CommunityView, MultiCommunityView, NotificationData,
    NotificationEntry, NotificationId, NotificationItem, PersonId, PostId, PostView,
    RegistrationApplicationView,
};

use crate::pagination::Paged;
use crate::reconcile::{List, changed, patch_field, replace_by_identity};
use crate::tree::{CommentTree, insert_into_tree, patch_tree, replace_in_tree};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Edit, vote, lock, feature, save...: the server's fresh view.
    PostUpdated(Arc<PostView>),
    CommentUpdated(Arc<CommentView>),
    CommentCreated(Arc<CommentView>),
    PostsRead {
        post_ids: Vec<PostId>,
        read: bool,
    },
    /// `community: None` is a site-wide ban.
    CreatorBanned {
        person: PersonId,
        community: Option<CommunityId>,
        banned: bool,
    },
    PersonBlocked {
        person: PersonId,
        blocked: bool,
    },
    CommunityUpdated(Arc<CommunityView>),
    MultiCommunityUpdated(Arc<MultiCommunityView>),
    RegistrationUpdated(Arc<RegistrationApplicationView>),
    NotificationRead {
        id: NotificationId,
        read: bool,
    },
    AllNotificationsRead,
}

impl Mutation {
    /// One-line confirmation for a toast.
    pub fn summary(&self) -> String {
        match self {
            Self::PostUpdated(v) => format!("Updated \"{}\"", v.post.name),
            Self::CommentUpdated(_) => "Comment updated".into(),
            Self::CommentCreated(_) => "Comment posted".into(),
            Self::PostsRead { post_ids, read } => format!(
                "Marked {} post(s) {}",
                post_ids.len(),
                if *read { "read" } else { "unread" }
            ),
            Self::CreatorBanned {
                community, banned, ..
            } => match (community, banned) {
                (None, true) => "User banned from site".into(),
                (None, false) => "User unbanned from site".into(),
                (Some(_), true) => "User banned from community".into(),
                (Some(_), false) => "User unbanned from community".into(),
            },
            Self::PersonBlocked { blocked, .. } => {
                if *blocked { "User blocked" } else { "User unblocked" }.into()
            }
            Self::CommunityUpdated(v) => format!("Updated !{}", v.community.name),
            Self::MultiCommunityUpdated(v) => format!("Updated {}", v.multi.name),
            Self::RegistrationUpdated(v) => {
                if v.registration_application.admin_id.is_some()
                    && v.registration_application.deny_reason.is_none()
                {
                    format!("Approved {}", v.creator.name)
                } else {
                    format!("Handled application from {}", v.creator.name)
                }
            }
            Self::NotificationRead { .. } => "Notification updated".into(),
            Self::AllNotificationsRead => "All notifications marked read".into(),
        }
    }
}

/// Fold a mutation into a piece of view data.
pub trait Reconcile: Sized {
    /// The updated value, or `None` when the mutation does not touch it.
    fn reconcile(&self, mutation: &Mutation) -> Option<Self>;
}

// ── Posts ────────────────────────────────────────────────────────────

/// Whether a ban flips the flag this view carries for its creator.
/// Site bans touch `creator.banned`, community bans only the matching
/// community's `creator_banned_from_community`.
fn ban_flips(
    site_banned: bool,
    community_banned: bool,
    view_community: CommunityId,
    community: Option<CommunityId>,
    banned: bool,
) -> bool {
    match community {
        None => site_banned != banned,
        Some(c) => c == view_community && community_banned != banned,
    }
}

impl Reconcile for List<PostView> {
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        let next = match mutation {
            Mutation::PostUpdated(updated) => replace_by_identity(self, updated, |v| v.post.id),
            Mutation::PostsRead { post_ids, read } => patch_field(
                self,
                |v| v.read != *read && post_ids.contains(&v.post.id),
                |v| v.read = *read,
            ),
            Mutation::CreatorBanned {
                person,
                community,
                banned,
            } => patch_field(
                self,
                |v| {
                    v.creator.id == *person
                        && ban_flips(
                            v.creator.banned,
                            v.creator_banned_from_community,
                            v.community.id,
                            *community,
                            *banned,
                        )
                },
                |v| match community {
                    None => v.creator.banned = *banned,
                    Some(_) => v.creator_banned_from_community = *banned,
                },
            ),
            Mutation::PersonBlocked { person, blocked } => patch_field(
                self,
                |v| v.creator.id == *person && v.creator_blocked != *blocked,
                |v| v.creator_blocked = *blocked,
            ),
            Mutation::CommunityUpdated(c) => patch_field(
                self,
                |v| v.community.id == c.community.id,
                |v| {
                    v.community = c.community.clone();
                    v.subscribed = c.subscribed;
                },
            ),
            _ => return None,
        };
        changed(self, next)
    }
}

impl Reconcile for Arc<PostView> {
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        let single: List<PostView> = Arc::new(vec![Arc::clone(self)]);
        single
            .reconcile(mutation)
            .and_then(|list| list.first().cloned())
    }
}

// ── Comments ─────────────────────────────────────────────────────────

/// Comment tree of one post.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub post_id: PostId,
    pub comments: CommentTree,
}

impl Reconcile for Thread {
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        let next = match mutation {
            Mutation::CommentCreated(new) if new.comment.post_id == self.post_id => {
                insert_into_tree(&self.comments, Arc::clone(new), new.comment.parent_id())
            }
            Mutation::CommentUpdated(updated) => replace_in_tree(&self.comments, updated),
            Mutation::CreatorBanned {
                person,
                community,
                banned,
            } => patch_tree(
                &self.comments,
                |c| {
                    c.creator.id == *person
                        && ban_flips(
                            c.creator.banned,
                            c.creator_banned_from_community,
                            c.community.id,
                            *community,
                            *banned,
                        )
                },
                |c| match community {
                    None => c.creator.banned = *banned,
                    Some(_) => c.creator_banned_from_community = *banned,
                },
            ),
            Mutation::PersonBlocked { person, blocked } => patch_tree(
                &self.comments,
                |c| c.creator.id == *person && c.creator_blocked != *blocked,
                |c| c.creator_blocked = *blocked,
            ),
            _ => return None,
        };
        changed(&self.comments, next).map(|comments| Self {
            post_id: self.post_id,
            comments,
        })
    }
}

// ── Communities ──────────────────────────────────────────────────────

impl Reconcile for List<CommunityView> {
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        match mutation {
            Mutation::CommunityUpdated(updated) => {
                changed(self, replace_by_identity(self, updated, |v| v.community.id))
            }
            _ => None,
        }
    }
}

impl Reconcile for List<MultiCommunityView> {
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        match mutation {
            Mutation::MultiCommunityUpdated(updated) => {
                changed(self, replace_by_identity(self, updated, |v| v.multi.id))
            }
            _ => None,
        }
    }
}

// ── Admin queue ──────────────────────────────────────────────────────

impl Reconcile for List<RegistrationApplicationView> {
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        match mutation {
            Mutation::RegistrationUpdated(updated) => changed(
                self,
                replace_by_identity(self, updated, |v| v.registration_application.id),
            ),
            _ => None,
        }
    }
}

// ── Inbox ────────────────────────────────────────────────────────────

fn notification_comment_id(entry: &NotificationEntry) -> Option<lemvue_api::types::CommentId> {
    match entry {
        NotificationEntry::Known(NotificationItem {
            data: NotificationData::Reply { comment } | NotificationData::Mention { comment },
            ..
        }) => Some(comment.comment.id),
        _ => None,
    }
}

impl Reconcile for List<NotificationEntry> {
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        let next = match mutation {
            Mutation::NotificationRead { id, read } => patch_field(
                self,
                |n| n.id() == *id && n.read() != *read,
                |n| *n = n.with_read(*read),
            ),
            Mutation::AllNotificationsRead => {
                patch_field(self, |n| !n.read(), |n| *n = n.with_read(true))
            }
            Mutation::CommentUpdated(updated) => patch_field(
                self,
                |n| notification_comment_id(n) == Some(updated.comment.id),
                |n| {
                    if let NotificationEntry::Known(NotificationItem {
                        data:
                            NotificationData::Reply { comment } | NotificationData::Mention { comment },
                        ..
                    }) = n
                    {
                        *comment = Box::new(CommentView::clone(updated));
                    }
                },
            ),
            _ => return None,
        };
        changed(self, next)
    }
}

// ── Paged wrappers ───────────────────────────────────────────────────

impl<T> Reconcile for Paged<T>
where
    List<T>: Reconcile,
{
    fn reconcile(&self, mutation: &Mutation) -> Option<Self> {
        self.items
            .reconcile(mutation)
            .map(|items| self.with_items(items))
    }
}
