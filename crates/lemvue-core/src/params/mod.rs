//! Typed route parameters.
//!
//! Every routed view owns one parameter type implementing [`RouteParams`]:
//! a pure parser from the query string (falling back to a default for
//! every absent or invalid value) and a pure serializer that omits values
//! equal to their default. The fetch controller compares parsed values to
//! decide whether to fetch again.

mod query;
mod types;

use std::str::FromStr;

pub use query::Query;
pub use types::{
    CommunityListParams, InboxParams, ModlogParams, MultiCommunityListParams, PostListParams,
    PostParams, RegistrationParams,
};

use lemvue_api::types::{CommentSortType, ListingType, MyUserInfo, PostSortType, SiteView};

use crate::pagination::{CursorPage, PageCursor, PageDirection};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Site and account level defaults that parameter parsing falls back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefaults {
    pub listing: ListingType,
    pub post_sort: PostSortType,
    pub comment_sort: CommentSortType,
    pub page_size: u32,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            listing: ListingType::default(),
            post_sort: PostSortType::default(),
            comment_sort: CommentSortType::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewDefaults {
    /// Site configuration, overridden by the signed-in user's preferences.
    pub fn from_site(site: &SiteView, me: Option<&MyUserInfo>, page_size: u32) -> Self {
        let local = &site.local_site;
        let user = me.map(|m| &m.local_user_view.local_user);
        Self {
            listing: user
                .and_then(|u| u.default_listing_type)
                .unwrap_or(local.default_post_listing_type),
            post_sort: user
                .and_then(|u| u.default_post_sort_type)
                .unwrap_or(local.default_post_sort_type),
            comment_sort: user
                .and_then(|u| u.default_comment_sort_type)
                .unwrap_or(local.default_comment_sort_type),
            page_size: page_size.max(1),
        }
    }
}

/// Pure query-string boundary of a routed view.
pub trait RouteParams: Sized + Clone + PartialEq {
    fn parse(query: &Query, defaults: &ViewDefaults) -> Self;

    /// Serialize, leaving out every value equal to its default.
    fn to_query(&self, defaults: &ViewDefaults) -> Query;

    /// Apply a partial update and return the resulting query string.
    fn with(&self, defaults: &ViewDefaults, update: impl FnOnce(&mut Self)) -> String {
        let mut next = self.clone();
        update(&mut next);
        next.to_query(defaults).to_string()
    }
}

// ── Shared field codecs ──────────────────────────────────────────────

pub(crate) const CURSOR_KEY: &str = "cursor";
pub(crate) const DIRECTION_KEY: &str = "dir";

pub(crate) fn enum_or<T: FromStr>(query: &Query, key: &str, default: T) -> T {
    query.get_parsed(key).unwrap_or(default)
}

pub(crate) fn set_unless_default<T: PartialEq + ToString>(
    query: &mut Query,
    key: &str,
    value: &T,
    default: &T,
) {
    if value != default {
        query.set(key, value.to_string());
    }
}

pub(crate) fn bool_or(query: &Query, key: &str, default: bool) -> bool {
    match query.get(key) {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}

pub(crate) fn positive_id(query: &Query, key: &str) -> Option<i32> {
    query.get_parsed::<i32>(key).filter(|id| *id > 0)
}

pub(crate) fn parse_cursor_page(query: &Query) -> CursorPage {
    match query.get(CURSOR_KEY) {
        Some(cursor) => CursorPage {
            cursor: Some(PageCursor(cursor.to_owned())),
            direction: enum_or(query, DIRECTION_KEY, PageDirection::Forward),
        },
        None => CursorPage::first(),
    }
}

pub(crate) fn write_cursor_page(query: &mut Query, page: &CursorPage) {
    if let Some(cursor) = &page.cursor {
        query.set(CURSOR_KEY, cursor.as_str());
        set_unless_default(query, DIRECTION_KEY, &page.direction, &PageDirection::Forward);
    }
}
