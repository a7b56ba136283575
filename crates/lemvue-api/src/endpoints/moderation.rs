use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::endpoint::endpoints;
use crate::types::{
    CommunityId, ModlogActionType, ModlogEntry, PagedResponse, PaginationCursor, PersonId,
    PersonView, RegistrationApplicationId, RegistrationApplicationView,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetModlog {
    #[serde(rename = "type_", skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ModlogActionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<CommunityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<PaginationCursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_back: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Site-wide ban, admin only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanPerson {
    pub person_id: PersonId,
    pub ban: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_or_restore_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanPersonResponse {
    pub person_view: PersonView,
    pub banned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanFromCommunity {
    pub community_id: CommunityId,
    pub person_id: PersonId,
    pub ban: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanFromCommunityResponse {
    pub person_view: PersonView,
    pub banned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRegistrationApplications {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<PaginationCursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_back: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproveRegistrationApplication {
    pub id: RegistrationApplicationId,
    pub approve: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationApplicationResponse {
    pub registration_application: RegistrationApplicationView,
}

endpoints! {
    GetModlog => Get "modlog" -> PagedResponse<ModlogEntry>;
    BanPerson => Post "admin/ban" -> BanPersonResponse;
    BanFromCommunity => Post "community/ban_user" -> BanFromCommunityResponse;
    ListRegistrationApplications => Get "admin/registration_application/list"
        -> PagedResponse<RegistrationApplicationView>;
    ApproveRegistrationApplication => Put "admin/registration_application/approve"
        -> RegistrationApplicationResponse;
}
