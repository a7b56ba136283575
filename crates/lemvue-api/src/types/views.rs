// ── Joined views ──
//
// What list and detail endpoints actually return: a source record plus
// its related rows and the requesting user's relationship to it.

use serde::{Deserialize, Serialize};

use super::SubscribedType;
use super::source::{
    Comment, Community, LocalSite, LocalUser, MultiCommunity, Person, Post, PrivateMessage,
    RegistrationApplication, Site,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub creator: Person,
    pub community: Community,
    #[serde(default)]
    pub creator_banned_from_community: bool,
    #[serde(default)]
    pub creator_is_moderator: bool,
    #[serde(default)]
    pub creator_is_admin: bool,
    #[serde(default)]
    pub creator_blocked: bool,
    #[serde(default)]
    pub subscribed: SubscribedType,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub my_vote: Option<i16>,
    #[serde(default)]
    pub unread_comments: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub creator: Person,
    pub post: Post,
    pub community: Community,
    #[serde(default)]
    pub creator_banned_from_community: bool,
    #[serde(default)]
    pub creator_is_moderator: bool,
    #[serde(default)]
    pub creator_is_admin: bool,
    #[serde(default)]
    pub creator_blocked: bool,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub my_vote: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityView {
    pub community: Community,
    #[serde(default)]
    pub subscribed: SubscribedType,
    #[serde(default)]
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCommunityView {
    pub multi: MultiCommunity,
    pub owner: Person,
    #[serde(default)]
    pub follow_state: Option<SubscribedType>,
    #[serde(default)]
    pub communities: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonView {
    pub person: Person,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub post_count: i64,
    #[serde(default)]
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateMessageView {
    pub private_message: PrivateMessage,
    pub creator: Person,
    pub recipient: Person,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationApplicationView {
    pub registration_application: RegistrationApplication,
    pub creator_local_user: LocalUser,
    pub creator: Person,
    #[serde(default)]
    pub admin: Option<Person>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalUserView {
    pub local_user: LocalUser,
    pub person: Person,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteView {
    pub site: Site,
    pub local_site: LocalSite,
}

/// Everything the client knows about the signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyUserInfo {
    pub local_user_view: LocalUserView,
    #[serde(default)]
    pub follows: Vec<Community>,
    #[serde(default)]
    pub moderates: Vec<Community>,
    #[serde(default)]
    pub community_blocks: Vec<Community>,
    #[serde(default)]
    pub person_blocks: Vec<Person>,
}
