// ── Command API ──
//
// All write operations flow through a unified `Command` enum; every one
// of them needs a signed-in user. The instance maps each variant to one
// endpoint call and turns the response into a single `Mutation` for the
// views to reconcile.

use chrono::{DateTime, Utc};

use lemvue_api::types::{
    CommentId, CommunityId, MultiCommunityId, NotificationId, PersonId, PostId,
    RegistrationApplicationId,
};

/// Vote direction. The wire encodes it as `1`, `-1`, or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
    Clear,
}

impl Vote {
    pub fn score(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
            Self::Clear => 0,
        }
    }

    /// Pressing the same vote again clears it.
    pub fn toggle(current: Option<i16>, pressed: Self) -> Self {
        if current == Some(pressed.score()) {
            Self::Clear
        } else {
            pressed
        }
    }
}

/// All write operations against an instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Posts ────────────────────────────────────────────────────────
    VotePost {
        post_id: PostId,
        vote: Vote,
    },
    EditPost {
        post_id: PostId,
        name: Option<String>,
        body: Option<String>,
    },
    MarkPostsRead {
        post_ids: Vec<PostId>,
        read: bool,
    },

    // ── Comments ─────────────────────────────────────────────────────
    VoteComment {
        comment_id: CommentId,
        vote: Vote,
    },
    EditComment {
        comment_id: CommentId,
        content: String,
    },
    CreateComment {
        post_id: PostId,
        parent_id: Option<CommentId>,
        content: String,
    },

    // ── Moderation ───────────────────────────────────────────────────
    BanPerson {
        person_id: PersonId,
        ban: bool,
        reason: Option<String>,
        remove_data: bool,
        expires_at: Option<DateTime<Utc>>,
    },
    BanFromCommunity {
        community_id: CommunityId,
        person_id: PersonId,
        ban: bool,
        reason: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    },
    BlockPerson {
        person_id: PersonId,
        block: bool,
    },

    // ── Communities ──────────────────────────────────────────────────
    FollowCommunity {
        community_id: CommunityId,
        follow: bool,
    },
    FollowMultiCommunity {
        multi_community_id: MultiCommunityId,
        follow: bool,
    },

    // ── Admin queue ──────────────────────────────────────────────────
    ApproveRegistration {
        id: RegistrationApplicationId,
    },
    DenyRegistration {
        id: RegistrationApplicationId,
        reason: Option<String>,
    },

    // ── Inbox ────────────────────────────────────────────────────────
    MarkNotificationRead {
        id: NotificationId,
        read: bool,
    },
    MarkAllNotificationsRead,
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VotePost { .. } => "vote_post",
            Self::EditPost { .. } => "edit_post",
            Self::MarkPostsRead { .. } => "mark_posts_read",
            Self::VoteComment { .. } => "vote_comment",
            Self::EditComment { .. } => "edit_comment",
            Self::CreateComment { .. } => "create_comment",
            Self::BanPerson { .. } => "ban_person",
            Self::BanFromCommunity { .. } => "ban_from_community",
            Self::BlockPerson { .. } => "block_person",
            Self::FollowCommunity { .. } => "follow_community",
            Self::FollowMultiCommunity { .. } => "follow_multi_community",
            Self::ApproveRegistration { .. } => "approve_registration",
            Self::DenyRegistration { .. } => "deny_registration",
            Self::MarkNotificationRead { .. } => "mark_notification_read",
            Self::MarkAllNotificationsRead => "mark_all_notifications_read",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_vote_twice_clears() {
        assert_eq!(Vote::toggle(Some(1), Vote::Up), Vote::Clear);
        assert_eq!(Vote::toggle(Some(-1), Vote::Up), Vote::Up);
        assert_eq!(Vote::toggle(None, Vote::Down), Vote::Down);
    }

    #[test]
    fn vote_scores() {
        assert_eq!(Vote::Up.score(), 1);
        assert_eq!(Vote::Down.score(), -1);
        assert_eq!(Vote::Clear.score(), 0);
    }
}
