//! Wire model for the instance's JSON API.

pub mod ids;
pub mod modlog;
pub mod notification;
pub mod source;
pub mod views;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub use ids::*;
pub use modlog::{ModlogAction, ModlogEntry, ModlogItem, UnrecognizedModlogEntry};
pub use notification::{
    NotificationData, NotificationEntry, NotificationItem, UnrecognizedNotification,
};
pub use source::{
    Comment, Community, Instance, LocalSite, LocalUser, MultiCommunity, Person, Post,
    PrivateMessage, RegistrationApplication, Site,
};
pub use views::{
    CommentView, CommunityView, LocalUserView, MultiCommunityView, MyUserInfo, PersonView,
    PostView, PrivateMessageView, RegistrationApplicationView, SiteView,
};

// ── Pagination envelope ─────────────────────────────────────────────

/// Opaque cursor handed out by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaginationCursor(pub String);

impl PaginationCursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PaginationCursor {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

/// Envelope for every cursor-paginated list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page: Option<PaginationCursor>,
    #[serde(default)]
    pub prev_page: Option<PaginationCursor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ── Enumerations ────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum PostSortType {
    #[default]
    Active,
    Hot,
    New,
    Old,
    Scaled,
    Controversial,
    MostComments,
    NewComments,
    TopDay,
    TopWeek,
    TopMonth,
    TopYear,
    TopAll,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum CommentSortType {
    #[default]
    Hot,
    Top,
    New,
    Old,
    Controversial,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum ListingType {
    #[default]
    All,
    Local,
    Subscribed,
    ModeratorView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum SubscribedType {
    Subscribed,
    #[default]
    NotSubscribed,
    Pending,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum ModlogActionType {
    #[default]
    All,
    ModRemovePost,
    ModLockPost,
    ModFeaturePost,
    ModRemoveComment,
    ModLockComment,
    ModRemoveCommunity,
    ModBanFromCommunity,
    ModAddCommunity,
    ModTransferCommunity,
    ModAdd,
    ModBan,
    ModChangeCommunityVisibility,
    AdminPurgePerson,
    AdminPurgeCommunity,
    AdminPurgePost,
    AdminPurgeComment,
    AdminBlockInstance,
    AdminAllowInstance,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum NotificationKind {
    Reply,
    Mention,
    Subscription,
    PrivateMessage,
    ModAction,
}
