use serde::{Deserialize, Serialize};
use url::Url;

use crate::endpoint::endpoints;
use crate::types::{
    CommunityId, ListingType, MultiCommunityId, PagedResponse, PaginationCursor, PostId,
    PostSortType, PostView, SuccessResponse,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPosts {
    #[serde(rename = "type_", skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PostSortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<CommunityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_community_id: Option<MultiCommunityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<PaginationCursor>,
    /// Walk backwards from `page_cursor` instead of forwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_back: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPost {
    pub id: PostId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResponse {
    pub post_view: PostView,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditPost {
    pub post_id: PostId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePostLike {
    pub post_id: PostId,
    /// `1`, `-1`, or `0` to clear.
    pub score: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkPostsAsRead {
    pub post_ids: Vec<PostId>,
    pub read: bool,
}

endpoints! {
    GetPosts => Get "post/list" -> PagedResponse<PostView>;
    GetPost => Get "post" -> PostResponse;
    EditPost => Put "post" -> PostResponse;
    CreatePostLike => Post "post/like" -> PostResponse;
    MarkPostsAsRead => Post "post/mark_as_read/many" -> SuccessResponse;
}
