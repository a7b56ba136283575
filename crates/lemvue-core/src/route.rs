// ── Routes ──
//
// Path + query addressing for every routed view. Parsing and printing
// are pure; history and navigation live in the front end.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

use lemvue_api::types::PostId;

use crate::params::Query;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// Front page feed.
    Home,
    /// Feed of one community, by name (`rust` or `rust@lemmy.ml`).
    Community(String),
    Post(PostId),
    Inbox,
    Modlog,
    Communities,
    MultiCommunities,
    Registrations,
    /// Return leg of an OAuth login.
    OAuthCallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: RouteKind,
    pub query: Query,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no view at {0}")]
pub struct UnknownRoute(pub String);

impl Route {
    pub fn new(kind: RouteKind) -> Self {
        Self {
            kind,
            query: Query::new(),
        }
    }

    pub fn with_query(kind: RouteKind, query: Query) -> Self {
        Self { kind, query }
    }

    pub fn home() -> Self {
        Self::new(RouteKind::Home)
    }

    pub fn path(&self) -> String {
        match &self.kind {
            RouteKind::Home => "/".into(),
            RouteKind::Community(name) => format!("/c/{name}"),
            RouteKind::Post(id) => format!("/post/{id}"),
            RouteKind::Inbox => "/inbox".into(),
            RouteKind::Modlog => "/modlog".into(),
            RouteKind::Communities => "/communities".into(),
            RouteKind::MultiCommunities => "/multi_communities".into(),
            RouteKind::Registrations => "/registration_applications".into(),
            RouteKind::OAuthCallback => "/oauth/callback".into(),
        }
    }

    /// Same path, different query string.
    pub fn with_query_string(&self, raw: &str) -> Self {
        Self {
            kind: self.kind.clone(),
            query: Query::parse(raw),
        }
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let kind = match segments.as_slice() {
            [] => RouteKind::Home,
            ["c", name] => RouteKind::Community((*name).to_owned()),
            ["post", id] => RouteKind::Post(PostId(
                id.parse().map_err(|_| UnknownRoute(raw.to_owned()))?,
            )),
            ["inbox"] => RouteKind::Inbox,
            ["modlog"] => RouteKind::Modlog,
            ["communities"] => RouteKind::Communities,
            ["multi_communities"] => RouteKind::MultiCommunities,
            ["registration_applications"] => RouteKind::Registrations,
            ["oauth", "callback"] => RouteKind::OAuthCallback,
            _ => return Err(UnknownRoute(raw.to_owned())),
        };
        Ok(Self {
            kind,
            query: Query::parse(query),
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

/// Identity of one navigation history entry. Two visits to the same route
/// get different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey(String);

impl HistoryKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HistoryKey {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for HistoryKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_and_prints_paths() {
        for raw in [
            "/",
            "/c/rust@lemmy.ml?sort=New",
            "/post/42",
            "/inbox?unread=true",
            "/modlog",
            "/communities?page=2",
            "/multi_communities",
            "/registration_applications",
            "/oauth/callback?code=abc&state=xyz",
        ] {
            let route: Route = raw.parse().unwrap();
            assert_eq!(route.to_string(), raw);
        }
    }

    #[test]
    fn rejects_unknown_paths() {
        assert!("/nope".parse::<Route>().is_err());
        assert!("/post/abc".parse::<Route>().is_err());
    }

    #[test]
    fn history_keys_are_unique() {
        assert_ne!(HistoryKey::new(), HistoryKey::new());
    }
}
