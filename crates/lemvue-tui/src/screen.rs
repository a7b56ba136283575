//! Screen identifiers and their place in the tab bar.

use std::fmt;

use lemvue_core::{Route, RouteKind};

/// One screen per routed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Feed,
    Communities,
    MultiCommunities,
    Inbox,
    Modlog,
    Registrations,
    /// Opened from a row, not from the tab bar.
    Post,
}

impl ScreenId {
    /// Tab-bar order.
    pub const TABS: [ScreenId; 6] = [
        Self::Feed,
        Self::Communities,
        Self::MultiCommunities,
        Self::Inbox,
        Self::Modlog,
        Self::Registrations,
    ];

    /// The screen that shows `route`. The OAuth callback has none.
    pub fn for_route(route: &Route) -> Option<Self> {
        Some(match route.kind {
            RouteKind::Home | RouteKind::Community(_) => Self::Feed,
            RouteKind::Post(_) => Self::Post,
            RouteKind::Inbox => Self::Inbox,
            RouteKind::Modlog => Self::Modlog,
            RouteKind::Communities => Self::Communities,
            RouteKind::MultiCommunities => Self::MultiCommunities,
            RouteKind::Registrations => Self::Registrations,
            RouteKind::OAuthCallback => return None,
        })
    }

    /// Where a tab switch lands.
    pub fn home_route(self) -> Option<Route> {
        let kind = match self {
            Self::Feed => RouteKind::Home,
            Self::Communities => RouteKind::Communities,
            Self::MultiCommunities => RouteKind::MultiCommunities,
            Self::Inbox => RouteKind::Inbox,
            Self::Modlog => RouteKind::Modlog,
            Self::Registrations => RouteKind::Registrations,
            Self::Post => return None,
        };
        Some(Route::new(kind))
    }

    /// Number key (1-6). The post screen has none.
    pub fn number(self) -> Option<u8> {
        Self::TABS
            .iter()
            .position(|&s| s == self)
            .and_then(|i| u8::try_from(i + 1).ok())
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::TABS.get(usize::from(n).checked_sub(1)?).copied()
    }

    /// Next tab (wraps). The post screen continues at the feed.
    pub fn next(self) -> Self {
        match Self::TABS.iter().position(|&s| s == self) {
            Some(idx) => Self::TABS[(idx + 1) % Self::TABS.len()],
            None => Self::Feed,
        }
    }

    pub fn prev(self) -> Self {
        match Self::TABS.iter().position(|&s| s == self) {
            Some(idx) => Self::TABS[(idx + Self::TABS.len() - 1) % Self::TABS.len()],
            None => Self::Feed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Feed => "Feed",
            Self::Communities => "Communities",
            Self::MultiCommunities => "Multis",
            Self::Inbox => "Inbox",
            Self::Modlog => "Modlog",
            Self::Registrations => "Applications",
            Self::Post => "Post",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn number_keys_round_trip_through_tabs() {
        for tab in ScreenId::TABS {
            assert_eq!(ScreenId::from_number(tab.number().unwrap()), Some(tab));
        }
        assert_eq!(ScreenId::Post.number(), None);
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(7), None);
    }

    #[test]
    fn tab_cycling_wraps() {
        assert_eq!(ScreenId::Registrations.next(), ScreenId::Feed);
        assert_eq!(ScreenId::Feed.prev(), ScreenId::Registrations);
        assert_eq!(ScreenId::Post.next(), ScreenId::Feed);
    }

    #[test]
    fn routes_pick_their_screen() {
        let screen = |raw: &str| ScreenId::for_route(&raw.parse().unwrap());
        assert_eq!(screen("/c/rust?sort=New"), Some(ScreenId::Feed));
        assert_eq!(screen("/post/4"), Some(ScreenId::Post));
        assert_eq!(screen("/registration_applications"), Some(ScreenId::Registrations));
        assert_eq!(screen("/oauth/callback?code=a&state=b"), None);
    }
}
