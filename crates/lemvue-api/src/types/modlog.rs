// ── Moderation log ──
//
// Every entry shares `id`/`published`/`moderator`; the action payload is
// tagged by `type_`. Entries whose tag this client does not know decode
// into `ModlogEntry::Unrecognized` instead of failing the whole page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ModlogActionType;
use super::ids::ModlogId;
use super::source::{Comment, Community, Instance, Person, Post};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModlogEntry {
    Known(ModlogItem),
    Unrecognized(UnrecognizedModlogEntry),
}

impl ModlogEntry {
    pub fn id(&self) -> ModlogId {
        match self {
            Self::Known(item) => item.id,
            Self::Unrecognized(raw) => raw.id,
        }
    }

    pub fn published(&self) -> DateTime<Utc> {
        match self {
            Self::Known(item) => item.published,
            Self::Unrecognized(raw) => raw.published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModlogItem {
    pub id: ModlogId,
    pub published: DateTime<Utc>,
    /// Hidden when the instance does not reveal moderator names.
    #[serde(default)]
    pub moderator: Option<Person>,
    #[serde(flatten)]
    pub action: ModlogAction,
}

/// An entry from a newer server whose `type_` this client cannot decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrecognizedModlogEntry {
    pub id: ModlogId,
    pub published: DateTime<Utc>,
    #[serde(rename = "type_")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type_")]
pub enum ModlogAction {
    ModRemovePost {
        post: Post,
        community: Community,
        other_person: Person,
        removed: bool,
        #[serde(default)]
        reason: Option<String>,
    },
    ModLockPost {
        post: Post,
        community: Community,
        other_person: Person,
        locked: bool,
        #[serde(default)]
        reason: Option<String>,
    },
    ModFeaturePost {
        post: Post,
        community: Community,
        other_person: Person,
        featured: bool,
        #[serde(default)]
        is_featured_community: bool,
    },
    ModRemoveComment {
        comment: Comment,
        post: Post,
        community: Community,
        other_person: Person,
        removed: bool,
        #[serde(default)]
        reason: Option<String>,
    },
    ModLockComment {
        comment: Comment,
        post: Post,
        community: Community,
        other_person: Person,
        locked: bool,
        #[serde(default)]
        reason: Option<String>,
    },
    ModRemoveCommunity {
        community: Community,
        removed: bool,
        #[serde(default)]
        reason: Option<String>,
    },
    ModBanFromCommunity {
        community: Community,
        other_person: Person,
        banned: bool,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        expires_at: Option<DateTime<Utc>>,
    },
    ModAddCommunity {
        community: Community,
        other_person: Person,
        removed: bool,
    },
    ModTransferCommunity {
        community: Community,
        other_person: Person,
    },
    ModAdd {
        other_person: Person,
        removed: bool,
    },
    ModBan {
        other_person: Person,
        banned: bool,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        expires_at: Option<DateTime<Utc>>,
    },
    ModChangeCommunityVisibility {
        community: Community,
        visibility: String,
    },
    AdminPurgePerson {
        #[serde(default)]
        reason: Option<String>,
    },
    AdminPurgeCommunity {
        #[serde(default)]
        reason: Option<String>,
    },
    AdminPurgePost {
        community: Community,
        #[serde(default)]
        reason: Option<String>,
    },
    AdminPurgeComment {
        post: Post,
        #[serde(default)]
        reason: Option<String>,
    },
    AdminBlockInstance {
        instance: Instance,
        blocked: bool,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        expires_at: Option<DateTime<Utc>>,
    },
    AdminAllowInstance {
        instance: Instance,
        allowed: bool,
        #[serde(default)]
        reason: Option<String>,
    },
}

impl ModlogAction {
    /// The filter value that selects this kind of entry.
    pub fn kind(&self) -> ModlogActionType {
        match self {
            Self::ModRemovePost { .. } => ModlogActionType::ModRemovePost,
            Self::ModLockPost { .. } => ModlogActionType::ModLockPost,
            Self::ModFeaturePost { .. } => ModlogActionType::ModFeaturePost,
            Self::ModRemoveComment { .. } => ModlogActionType::ModRemoveComment,
            Self::ModLockComment { .. } => ModlogActionType::ModLockComment,
            Self::ModRemoveCommunity { .. } => ModlogActionType::ModRemoveCommunity,
            Self::ModBanFromCommunity { .. } => ModlogActionType::ModBanFromCommunity,
            Self::ModAddCommunity { .. } => ModlogActionType::ModAddCommunity,
            Self::ModTransferCommunity { .. } => ModlogActionType::ModTransferCommunity,
            Self::ModAdd { .. } => ModlogActionType::ModAdd,
            Self::ModBan { .. } => ModlogActionType::ModBan,
            Self::ModChangeCommunityVisibility { .. } => {
                ModlogActionType::ModChangeCommunityVisibility
            }
            Self::AdminPurgePerson { .. } => ModlogActionType::AdminPurgePerson,
            Self::AdminPurgeCommunity { .. } => ModlogActionType::AdminPurgeCommunity,
            Self::AdminPurgePost { .. } => ModlogActionType::AdminPurgePost,
            Self::AdminPurgeComment { .. } => ModlogActionType::AdminPurgeComment,
            Self::AdminBlockInstance { .. } => ModlogActionType::AdminBlockInstance,
            Self::AdminAllowInstance { .. } => ModlogActionType::AdminAllowInstance,
        }
    }
}
