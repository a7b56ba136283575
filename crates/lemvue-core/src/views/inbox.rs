// ── Inbox ──
//
// Notifications for the signed-in user plus the shared badge counts. The
// counts are owned by `UnreadCounts`; this view only reads them.

use std::sync::Arc;

use lemvue_api::types::{NotificationEntry, NotificationId};

use super::{Fetch, Fetched, View, filter_query, next_page_query, prev_page_query};
use crate::fetch::{FetchController, FetchRequest};
use crate::guard::{FetchGuard, Slot};
use crate::mutation::{Mutation, Reconcile};
use crate::pagination::Paged;
use crate::params::{InboxParams, RouteParams, ViewDefaults};
use crate::prefetch::RouteData;
use crate::render::{Project, Projection};
use crate::request_state::RequestState;
use crate::route::Route;
use crate::services::{Unread, UnreadCounts};

const NOTIFICATIONS: Slot = Slot("notifications");

#[derive(Debug)]
pub struct InboxView {
    notifications: FetchController<InboxParams, Paged<NotificationEntry>>,
    unread: Arc<UnreadCounts>,
    defaults: ViewDefaults,
}

impl InboxView {
    pub fn new(unread: Arc<UnreadCounts>) -> Self {
        Self {
            notifications: FetchController::new(NOTIFICATIONS, FetchGuard::new()),
            unread,
            defaults: ViewDefaults::default(),
        }
    }

    pub fn notifications(&self) -> &RequestState<Paged<NotificationEntry>> {
        self.notifications.state()
    }

    pub fn params(&self) -> Option<&InboxParams> {
        self.notifications.key()
    }

    pub fn unread(&self) -> Unread {
        self.unread.get()
    }

    pub fn rows(&self) -> Vec<Projection<NotificationId>> {
        self.notifications
            .state()
            .success()
            .map(|page| page.items.iter().map(|n| n.project()).collect())
            .unwrap_or_default()
    }

    /// Ids on the current page still marked unread.
    pub fn unread_ids(&self) -> Vec<NotificationId> {
        self.notifications
            .state()
            .success()
            .map(|page| {
                page.items
                    .iter()
                    .filter(|n| !n.read())
                    .map(|n| n.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn next_page_query(&self) -> Option<String> {
        next_page_query(&self.notifications, &self.defaults)
    }

    pub fn prev_page_query(&self) -> Option<String> {
        prev_page_query(&self.notifications, &self.defaults)
    }

    pub fn filter_query(&self, update: impl FnOnce(&mut InboxParams)) -> Option<String> {
        filter_query(&self.notifications, &self.defaults, update)
    }

    fn request(&self, req: Option<FetchRequest<InboxParams>>) -> Vec<Fetch> {
        req.map(|req| Fetch::Inbox {
            req,
            limit: self.defaults.page_size,
        })
        .into_iter()
        .collect()
    }
}

impl View for InboxView {
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let params = InboxParams::parse(&route.query, defaults);
        let data = match prefetched {
            Some(RouteData::Inbox(page)) => Some(page),
            _ => None,
        };
        let req = self.notifications.mount(params, data);
        self.request(req)
    }

    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let req = self
            .notifications
            .track(InboxParams::parse(&route.query, defaults));
        self.request(req)
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::Inbox(token, result) => self.notifications.resolve(token, result),
            _ => false,
        }
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        self.notifications.update(|page| page.reconcile(mutation))
    }

    fn is_settled(&self) -> bool {
        self.notifications.state().is_terminal()
    }

    fn retry(&mut self) -> Vec<Fetch> {
        let req = self.notifications.refetch();
        self.request(req)
    }

    fn unmount(&mut self) {
        self.notifications.cancel();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::MockServer;

    use super::*;
    use crate::error::ErrorKind;
    use crate::views::tests::instance;

    fn entry(id: i32, read: bool) -> NotificationEntry {
        serde_json::from_value(json!({
            "id": id,
            "published": "2025-01-01T00:00:00Z",
            "read": read,
            "type_": "Poke"
        }))
        .unwrap()
    }

    fn mounted() -> InboxView {
        let mut view = InboxView::new(Arc::new(UnreadCounts::default()));
        let page = Paged::new(vec![entry(1, false), entry(2, true), entry(3, false)], None, None);
        view.mount(
            &"/inbox".parse().unwrap(),
            &ViewDefaults::default(),
            Some(RouteData::Inbox(page)),
        );
        view
    }

    #[test]
    fn mark_read_updates_one_row() {
        let mut view = mounted();
        assert_eq!(view.unread_ids(), vec![NotificationId(1), NotificationId(3)]);
        assert!(view.apply(&Mutation::NotificationRead {
            id: NotificationId(1),
            read: true
        }));
        assert_eq!(view.unread_ids(), vec![NotificationId(3)]);
    }

    #[test]
    fn mark_all_read_clears_page() {
        let mut view = mounted();
        assert!(view.apply(&Mutation::AllNotificationsRead));
        assert!(view.unread_ids().is_empty());
        assert!(!view.apply(&Mutation::AllNotificationsRead));
    }

    #[test]
    fn badge_reflects_shared_counts() {
        let counts = Arc::new(UnreadCounts::default());
        let view = InboxView::new(Arc::clone(&counts));
        counts.set(Unread {
            notifications: 4,
            ..Unread::default()
        });
        assert_eq!(view.unread().notifications, 4);
    }

    #[tokio::test]
    async fn anonymous_inbox_fails_as_unauthorized() {
        let server = MockServer::start().await;
        let instance = instance(&server);
        let mut view = InboxView::new(Arc::clone(&instance.services().unread));
        let fetch = view
            .mount(&"/inbox".parse().unwrap(), &ViewDefaults::default(), None)
            .remove(0);
        assert!(view.resolve(fetch.run(&instance).await));
        assert_eq!(
            view.notifications().error().unwrap().kind,
            ErrorKind::Unauthorized
        );
    }
}
