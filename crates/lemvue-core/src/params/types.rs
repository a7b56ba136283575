// ── Per-view parameter types ──
//
// Default table (value used when the query omits or garbles a key):
//
//   key        view(s)                        default
//   type       feed, communities              site/user listing type
//   sort       feed, communities, post        site/user post or comment sort
//   cursor     every cursor-paged view        first page
//   dir        every cursor-paged view        forward
//   page       communities                    1
//   action     modlog                         All
//   community  modlog                         none
//   mod, user  modlog                         none
//   kind       inbox                          all kinds
//   unread     inbox (false), registrations (true)
//   followed   multi-communities              false
//   comment    post                           none (whole thread)

use lemvue_api::types::{
    CommentId, CommentSortType, CommunityId, ListingType, ModlogActionType, NotificationKind,
    PersonId, PostSortType,
};

use super::{
    Query, RouteParams, ViewDefaults, bool_or, enum_or, parse_cursor_page, positive_id,
    set_unless_default, write_cursor_page,
};
use crate::pagination::{CursorPage, OffsetPage};

// ── Feed ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListParams {
    pub listing: ListingType,
    pub sort: PostSortType,
    pub page: CursorPage,
}

impl RouteParams for PostListParams {
    fn parse(query: &Query, defaults: &ViewDefaults) -> Self {
        Self {
            listing: enum_or(query, "type", defaults.listing),
            sort: enum_or(query, "sort", defaults.post_sort),
            page: parse_cursor_page(query),
        }
    }

    fn to_query(&self, defaults: &ViewDefaults) -> Query {
        let mut q = Query::new();
        set_unless_default(&mut q, "type", &self.listing, &defaults.listing);
        set_unless_default(&mut q, "sort", &self.sort, &defaults.post_sort);
        write_cursor_page(&mut q, &self.page);
        q
    }
}

// ── Post detail ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostParams {
    pub sort: CommentSortType,
    /// Show only the thread below this comment.
    pub comment: Option<CommentId>,
}

impl RouteParams for PostParams {
    fn parse(query: &Query, defaults: &ViewDefaults) -> Self {
        Self {
            sort: enum_or(query, "sort", defaults.comment_sort),
            comment: positive_id(query, "comment").map(CommentId),
        }
    }

    fn to_query(&self, defaults: &ViewDefaults) -> Query {
        let mut q = Query::new();
        set_unless_default(&mut q, "sort", &self.sort, &defaults.comment_sort);
        if let Some(id) = self.comment {
            q.set("comment", id.to_string());
        }
        q
    }
}

// ── Modlog ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModlogParams {
    pub action: ModlogActionType,
    pub community: Option<CommunityId>,
    pub moderator: Option<PersonId>,
    pub user: Option<PersonId>,
    pub page: CursorPage,
}

impl RouteParams for ModlogParams {
    fn parse(query: &Query, _defaults: &ViewDefaults) -> Self {
        Self {
            action: enum_or(query, "action", ModlogActionType::All),
            community: positive_id(query, "community").map(CommunityId),
            moderator: positive_id(query, "mod").map(PersonId),
            user: positive_id(query, "user").map(PersonId),
            page: parse_cursor_page(query),
        }
    }

    fn to_query(&self, _defaults: &ViewDefaults) -> Query {
        let mut q = Query::new();
        set_unless_default(&mut q, "action", &self.action, &ModlogActionType::All);
        for (key, id) in [
            ("community", self.community.map(|c| c.0)),
            ("mod", self.moderator.map(|p| p.0)),
            ("user", self.user.map(|p| p.0)),
        ] {
            if let Some(id) = id {
                q.set(key, id.to_string());
            }
        }
        write_cursor_page(&mut q, &self.page);
        q
    }
}

// ── Inbox ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxParams {
    /// `None` lists every kind.
    pub kind: Option<NotificationKind>,
    pub unread_only: bool,
    pub page: CursorPage,
}

impl RouteParams for InboxParams {
    fn parse(query: &Query, _defaults: &ViewDefaults) -> Self {
        Self {
            kind: query.get_parsed("kind"),
            unread_only: bool_or(query, "unread", false),
            page: parse_cursor_page(query),
        }
    }

    fn to_query(&self, _defaults: &ViewDefaults) -> Query {
        let mut q = Query::new();
        if let Some(kind) = self.kind {
            q.set("kind", kind.to_string());
        }
        set_unless_default(&mut q, "unread", &self.unread_only, &false);
        write_cursor_page(&mut q, &self.page);
        q
    }
}

// ── Community directory ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityListParams {
    pub listing: ListingType,
    pub sort: PostSortType,
    pub page: OffsetPage,
}

impl RouteParams for CommunityListParams {
    fn parse(query: &Query, defaults: &ViewDefaults) -> Self {
        Self {
            listing: enum_or(query, "type", defaults.listing),
            sort: enum_or(query, "sort", defaults.post_sort),
            page: OffsetPage::new(
                query.get_parsed::<u32>("page").unwrap_or(1),
                defaults.page_size,
            ),
        }
    }

    fn to_query(&self, defaults: &ViewDefaults) -> Query {
        let mut q = Query::new();
        set_unless_default(&mut q, "type", &self.listing, &defaults.listing);
        set_unless_default(&mut q, "sort", &self.sort, &defaults.post_sort);
        set_unless_default(&mut q, "page", &self.page.page, &1);
        q
    }
}

// ── Registration applications ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationParams {
    pub unread_only: bool,
    pub page: CursorPage,
}

impl RouteParams for RegistrationParams {
    fn parse(query: &Query, _defaults: &ViewDefaults) -> Self {
        Self {
            unread_only: bool_or(query, "unread", true),
            page: parse_cursor_page(query),
        }
    }

    fn to_query(&self, _defaults: &ViewDefaults) -> Query {
        let mut q = Query::new();
        set_unless_default(&mut q, "unread", &self.unread_only, &true);
        write_cursor_page(&mut q, &self.page);
        q
    }
}

// ── Multi-communities ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiCommunityListParams {
    pub followed_only: bool,
    pub page: CursorPage,
}

impl RouteParams for MultiCommunityListParams {
    fn parse(query: &Query, _defaults: &ViewDefaults) -> Self {
        Self {
            followed_only: bool_or(query, "followed", false),
            page: parse_cursor_page(query),
        }
    }

    fn to_query(&self, _defaults: &ViewDefaults) -> Query {
        let mut q = Query::new();
        set_unless_default(&mut q, "followed", &self.followed_only, &false);
        write_cursor_page(&mut q, &self.page);
        q
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::pagination::{PageCursor, PageDirection};

    fn defaults() -> ViewDefaults {
        ViewDefaults {
            listing: ListingType::Local,
            post_sort: PostSortType::Hot,
            comment_sort: CommentSortType::Top,
            page_size: 10,
        }
    }

    /// parse → serialize → parse is stable for arbitrary input.
    fn assert_round_trip<P: RouteParams + std::fmt::Debug>(raw: &str) {
        let d = defaults();
        let first = P::parse(&Query::parse(raw), &d);
        let second = P::parse(&Query::parse(&first.to_query(&d).to_string()), &d);
        assert_eq!(first, second, "round trip of {raw:?}");
    }

    const SAMPLES: &[&str] = &[
        "",
        "type=Subscribed&sort=TopWeek&cursor=abc&dir=backward",
        "sort=NotASort&type=",
        "cursor=x%2By&dir=forward",
        "action=ModBan&community=3&mod=-4&user=9&cursor=z",
        "kind=Mention&unread=true",
        "kind=Poke&unread=maybe",
        "page=3&type=All",
        "page=0",
        "page=-1",
        "unread=false&cursor=q&dir=backward",
        "followed=1",
        "sort=New&comment=42",
        "comment=abc",
    ];

    #[test]
    fn every_param_type_round_trips() {
        for raw in SAMPLES {
            assert_round_trip::<PostListParams>(raw);
            assert_round_trip::<PostParams>(raw);
            assert_round_trip::<ModlogParams>(raw);
            assert_round_trip::<InboxParams>(raw);
            assert_round_trip::<CommunityListParams>(raw);
            assert_round_trip::<RegistrationParams>(raw);
            assert_round_trip::<MultiCommunityListParams>(raw);
        }
    }

    #[test]
    fn feed_defaults_come_from_site() {
        let p = PostListParams::parse(&Query::parse("sort=bogus"), &defaults());
        assert_eq!(p.listing, ListingType::Local);
        assert_eq!(p.sort, PostSortType::Hot);
        assert!(p.page.is_first());
        assert!(p.to_query(&defaults()).is_empty());
    }

    #[test]
    fn partial_update_computes_query_string() {
        let d = defaults();
        let p = PostListParams::parse(&Query::parse("sort=New"), &d);
        let next = p.with(&d, |p| p.page = CursorPage::forward(PageCursor("c1".into())));
        assert_eq!(next, "sort=New&cursor=c1");
        let back = p.with(&d, |p| p.page = CursorPage::backward(PageCursor("c0".into())));
        let parsed = PostListParams::parse(&Query::parse(&back), &d);
        assert_eq!(parsed.page.direction, PageDirection::Backward);
    }

    #[test]
    fn modlog_ignores_non_positive_ids() {
        let p = ModlogParams::parse(&Query::parse("mod=-4&user=0&community=7"), &defaults());
        assert_eq!(p.moderator, None);
        assert_eq!(p.user, None);
        assert_eq!(p.community, Some(CommunityId(7)));
    }

    #[test]
    fn registrations_default_to_unread() {
        let p = RegistrationParams::parse(&Query::new(), &defaults());
        assert!(p.unread_only);
    }

    #[test]
    fn community_page_uses_view_page_size() {
        let p = CommunityListParams::parse(&Query::parse("page=4"), &defaults());
        assert_eq!(p.page, OffsetPage::new(4, 10));
    }
}
