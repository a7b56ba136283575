use serde::{Deserialize, Serialize};

use crate::endpoint::endpoints;
use crate::types::{
    CommunityId, CommunityView, ListingType, MultiCommunityId, MultiCommunityView, PagedResponse,
    PaginationCursor, PostSortType,
};

/// Community directory. Still page-number based on the server side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListCommunities {
    #[serde(rename = "type_", skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PostSortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCommunitiesResponse {
    pub communities: Vec<CommunityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowCommunity {
    pub community_id: CommunityId,
    pub follow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityResponse {
    pub community_view: CommunityView,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListMultiCommunities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followed_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<PaginationCursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_back: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowMultiCommunity {
    pub multi_community_id: MultiCommunityId,
    pub follow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCommunityResponse {
    pub multi_community_view: MultiCommunityView,
}

endpoints! {
    ListCommunities => Get "community/list" -> ListCommunitiesResponse;
    FollowCommunity => Post "community/follow" -> CommunityResponse;
    ListMultiCommunities => Get "multi_community/list" -> PagedResponse<MultiCommunityView>;
    FollowMultiCommunity => Post "multi_community/follow" -> MultiCommunityResponse;
}
