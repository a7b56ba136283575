use serde::{Deserialize, Serialize};

use crate::endpoint::endpoints;
use crate::types::{
    CommentId, CommentSortType, CommentView, PagedResponse, PaginationCursor, PostId,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetComments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    /// Fetch only the subtree below this comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CommentSortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<PaginationCursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentResponse {
    pub comment_view: CommentView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateComment {
    pub post_id: PostId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditComment {
    pub comment_id: CommentId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCommentLike {
    pub comment_id: CommentId,
    pub score: i16,
}

endpoints! {
    GetComments => Get "comment/list" -> PagedResponse<CommentView>;
    CreateComment => Post "comment" -> CommentResponse;
    EditComment => Put "comment" -> CommentResponse;
    CreateCommentLike => Post "comment/like" -> CommentResponse;
}
