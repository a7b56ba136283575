use serde::{Deserialize, Serialize};

use crate::endpoint::endpoints;
use crate::types::{
    NotificationEntry, NotificationId, NotificationKind, PagedResponse, PaginationCursor,
    SuccessResponse,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListNotifications {
    #[serde(rename = "type_", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NotificationKind>,
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
pub struct MarkNotificationAsRead {
    pub notification_id: NotificationId,
    pub read: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkAllNotificationsAsRead {}

endpoints! {
    ListNotifications => Get "account/notification/list" -> PagedResponse<NotificationEntry>;
    MarkNotificationAsRead => Post "account/notification/mark_as_read" -> SuccessResponse;
    MarkAllNotificationsAsRead => Post "account/notification/mark_as_read/all" -> SuccessResponse;
}
