//! Browser-style history: every navigation gets its own entry and key.

use lemvue_core::{HistoryKey, Route};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Entry {
    pub route: Route,
    pub key: HistoryKey,
}

impl Entry {
    fn new(route: Route) -> Self {
        Self {
            route,
            key: HistoryKey::new(),
        }
    }
}

#[derive(Debug)]
pub struct Navigator {
    entries: Vec<Entry>,
    index: usize,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![Entry::new(start)],
            index: 0,
        }
    }

    pub fn current(&self) -> &Entry {
        &self.entries[self.index]
    }

    /// Add an entry after the current one, dropping anything forward of it.
    pub fn push(&mut self, route: Route) -> &Entry {
        self.entries.truncate(self.index + 1);
        debug!(from = %self.current().route, to = %route, "push");
        self.entries.push(Entry::new(route));
        self.index = self.entries.len() - 1;
        self.current()
    }

    /// Swap the current entry for a new one (fresh key).
    pub fn replace(&mut self, route: Route) -> &Entry {
        self.entries[self.index] = Entry::new(route);
        self.current()
    }

    pub fn back(&mut self) -> Option<&Entry> {
        self.index = self.index.checked_sub(1)?;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&Entry> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn route(raw: &str) -> Route {
        raw.parse().unwrap()
    }

    #[test]
    fn revisits_get_distinct_keys() {
        let mut nav = Navigator::new(route("/"));
        let first = nav.current().key.clone();
        nav.push(route("/post/1"));
        let again = nav.push(route("/")).key.clone();
        assert_ne!(first, again);
    }

    #[test]
    fn back_and_forward_restore_entries() {
        let mut nav = Navigator::new(route("/"));
        let home = nav.current().key.clone();
        nav.push(route("/?cursor=c1"));
        let paged = nav.current().key.clone();

        assert_eq!(nav.back().unwrap().key, home);
        assert!(nav.back().is_none());
        assert!(nav.can_go_forward());
        assert_eq!(nav.forward().unwrap().key, paged);
        assert!(nav.forward().is_none());
    }

    #[test]
    fn push_discards_forward_entries() {
        let mut nav = Navigator::new(route("/"));
        nav.push(route("/inbox"));
        nav.back();
        nav.push(route("/modlog"));
        assert!(!nav.can_go_forward());
        assert_eq!(nav.current().route, route("/modlog"));
        assert_eq!(nav.back().unwrap().route, route("/"));
    }

    #[test]
    fn replace_keeps_position() {
        let mut nav = Navigator::new(route("/"));
        nav.push(route("/oauth/callback?code=x&state=y"));
        nav.replace(route("/inbox"));
        assert!(nav.can_go_back());
        assert_eq!(nav.current().route, route("/inbox"));
    }
}
