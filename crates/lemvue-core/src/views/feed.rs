// ── Post feed ──
//
// Front page or one community's posts, cursor paged. The community name
// comes from the route path, everything else from the query.

use lemvue_api::types::PostView;

use super::{Fetch, Fetched, View, filter_query, next_page_query, prev_page_query};
use crate::fetch::FetchController;
use crate::guard::{FetchGuard, Slot};
use crate::mutation::{Mutation, Reconcile};
use crate::pagination::Paged;
use crate::params::{PostListParams, RouteParams, ViewDefaults};
use crate::prefetch::RouteData;
use crate::request_state::RequestState;
use crate::route::{Route, RouteKind};

const POSTS: Slot = Slot("posts");

#[derive(Debug)]
pub struct FeedView {
    community: Option<String>,
    posts: FetchController<PostListParams, Paged<PostView>>,
    defaults: ViewDefaults,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedView {
    pub fn new() -> Self {
        Self {
            community: None,
            posts: FetchController::new(POSTS, FetchGuard::new()),
            defaults: ViewDefaults::default(),
        }
    }

    pub fn community(&self) -> Option<&str> {
        self.community.as_deref()
    }

    pub fn posts(&self) -> &RequestState<Paged<PostView>> {
        self.posts.state()
    }

    pub fn params(&self) -> Option<&PostListParams> {
        self.posts.key()
    }

    pub fn next_page_query(&self) -> Option<String> {
        next_page_query(&self.posts, &self.defaults)
    }

    pub fn prev_page_query(&self) -> Option<String> {
        prev_page_query(&self.posts, &self.defaults)
    }

    /// Query string with a new filter applied, back on the first page.
    pub fn filter_query(&self, update: impl FnOnce(&mut PostListParams)) -> Option<String> {
        filter_query(&self.posts, &self.defaults, update)
    }

    fn request(&self, req: crate::fetch::FetchRequest<PostListParams>) -> Fetch {
        Fetch::Feed {
            req,
            community: self.community.clone(),
            limit: self.defaults.page_size,
        }
    }
}

fn community_of(route: &Route) -> Option<String> {
    match &route.kind {
        RouteKind::Community(name) => Some(name.clone()),
        _ => None,
    }
}

impl View for FeedView {
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        self.community = community_of(route);
        let params = PostListParams::parse(&route.query, defaults);
        let data = match prefetched {
            Some(RouteData::Feed(page)) => Some(page),
            _ => None,
        };
        self.posts
            .mount(params, data)
            .map(|req| self.request(req))
            .into_iter()
            .collect()
    }

    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let params = PostListParams::parse(&route.query, defaults);
        let community = community_of(route);
        let req = if community == self.community {
            self.posts.track(params)
        } else {
            self.community = community;
            self.posts.mount(params, None)
        };
        req.map(|req| self.request(req)).into_iter().collect()
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::Feed(token, result) => self.posts.resolve(token, result),
            _ => false,
        }
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        self.posts.update(|page| page.reconcile(mutation))
    }

    fn is_settled(&self) -> bool {
        self.posts.state().is_terminal()
    }

    fn retry(&mut self) -> Vec<Fetch> {
        self.posts
            .refetch()
            .map(|req| self.request(req))
            .into_iter()
            .collect()
    }

    fn unmount(&mut self) {
        self.posts.cancel();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::mutation::tests::post;
    use crate::pagination::{CursorPage, PageCursor};
    use crate::route::HistoryKey;
    use crate::scroll::{ScrollRestorer, Viewport};
    use crate::storage::{MemoryStorage, ScrollStore};
    use crate::views::tests::{instance, page_json};
    use lemvue_api::types::PostId;

    fn defaults() -> ViewDefaults {
        ViewDefaults {
            page_size: 10,
            ..ViewDefaults::default()
        }
    }

    #[derive(Default)]
    struct ListViewport {
        offset: usize,
    }

    impl Viewport for ListViewport {
        fn offset(&self) -> usize {
            self.offset
        }

        fn scroll_to(&mut self, offset: usize) {
            self.offset = offset;
        }
    }

    #[test]
    fn prefetched_feed_is_adopted_without_fetching() {
        let mut view = FeedView::new();
        let page = Paged::new(vec![post(1, 10, 100)], None, None);
        let fetches = view.mount(&Route::home(), &defaults(), Some(RouteData::Feed(page)));
        assert!(fetches.is_empty());
        assert!(view.is_settled());
    }

    #[test]
    fn same_query_does_not_refetch() {
        let mut view = FeedView::new();
        let route: Route = "/?sort=New".parse().unwrap();
        assert_eq!(view.mount(&route, &defaults(), None).len(), 1);
        assert!(view.route_changed(&route, &defaults()).is_empty());
    }

    #[test]
    fn switching_community_refetches_with_same_query() {
        let mut view = FeedView::new();
        view.mount(&Route::home(), &defaults(), None);
        let fetches = view.route_changed(&"/c/rust".parse().unwrap(), &defaults());
        match fetches.as_slice() {
            [Fetch::Feed { community, .. }] => assert_eq!(community.as_deref(), Some("rust")),
            other => panic!("unexpected fetches: {other:?}"),
        }
    }

    #[test]
    fn stale_page_is_discarded() {
        let mut view = FeedView::new();
        let first = view.mount(&Route::home(), &defaults(), None).remove(0);
        let second = view
            .route_changed(&"/?sort=New".parse().unwrap(), &defaults())
            .remove(0);

        let newer = Paged::new(vec![post(2, 10, 100)], None, None);
        assert!(view.resolve(Fetched::Feed(second.token(), Ok(newer))));
        let older = Paged::new(vec![post(1, 10, 100)], None, None);
        assert!(!view.resolve(Fetched::Feed(first.token(), Ok(older))));

        let items = &view.posts().success().unwrap().items;
        assert_eq!(items[0].post.id, PostId(2));
    }

    #[test]
    fn vote_mutation_replaces_post_in_place() {
        let mut view = FeedView::new();
        let page = Paged::new(vec![post(1, 10, 100), post(2, 10, 100)], None, None);
        view.mount(&Route::home(), &defaults(), Some(RouteData::Feed(page)));

        let mut voted = post(2, 10, 100);
        voted.my_vote = Some(1);
        assert!(view.apply(&Mutation::PostUpdated(Arc::new(voted))));
        let items = &view.posts().success().unwrap().items;
        assert_eq!(items[1].my_vote, Some(1));

        assert!(!view.apply(&Mutation::AllNotificationsRead));
    }

    #[test]
    fn first_page_has_no_previous_page() {
        let mut view = FeedView::new();
        let page = Paged::new(
            vec![post(1, 10, 100)],
            Some(PageCursor("n".into())),
            Some(PageCursor("p".into())),
        );
        view.mount(&Route::home(), &defaults(), Some(RouteData::Feed(page)));
        assert!(view.prev_page_query().is_none());
        assert_eq!(view.next_page_query().as_deref(), Some("cursor=n"));
    }

    #[test]
    fn filter_change_returns_to_first_page() {
        let mut view = FeedView::new();
        let route: Route = "/?cursor=abc".parse().unwrap();
        view.mount(&route, &defaults(), None);
        let query = view
            .filter_query(|p| p.sort = lemvue_api::types::PostSortType::Old)
            .unwrap();
        assert!(!query.contains("cursor"));
        assert!(query.contains("sort=Old"));
    }

    #[tokio::test]
    async fn next_page_replaces_list_and_scrolls_to_top() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/post/list"))
            .and(query_param("page_cursor", "c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(11..=20, Some("c2"))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/post/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(1..=10, Some("c1"))))
            .mount(&server)
            .await;
        let instance = instance(&server);
        let store = ScrollStore::new(Arc::new(MemoryStorage::new()));
        let mut viewport = ListViewport::default();

        // First page.
        let mut view = FeedView::new();
        let first_entry = HistoryKey::new();
        let mut restorer = ScrollRestorer::new();
        restorer.on_mount(first_entry.clone());
        let fetch = view.mount(&Route::home(), &defaults(), None).remove(0);
        assert!(view.resolve(fetch.run(&instance).await));
        restorer.on_update(view.is_settled(), &store, &mut viewport);
        let first_items = Arc::clone(&view.posts().success().unwrap().items);
        assert_eq!(first_items.len(), 10);

        // Read halfway down, then follow the next-page link.
        viewport.scroll_to(7);
        let query = view.next_page_query().unwrap();
        assert_eq!(query, "cursor=c1");
        let next_route = Route::home().with_query_string(&query);
        restorer.on_unmount(&store, &mut viewport);
        restorer.on_mount(HistoryKey::new());

        let fetch = view.route_changed(&next_route, &defaults()).remove(0);
        match &fetch {
            Fetch::Feed { req, limit, .. } => {
                assert_eq!(req.key.page, CursorPage::forward(PageCursor("c1".into())));
                assert_eq!(*limit, 10);
            }
            other => panic!("unexpected fetch: {other:?}"),
        }
        assert!(matches!(view.posts(), RequestState::Loading));
        assert!(view.resolve(fetch.run(&instance).await));
        restorer.on_update(view.is_settled(), &store, &mut viewport);

        let page = view.posts().success().unwrap();
        assert!(!Arc::ptr_eq(&page.items, &first_items));
        let ids: Vec<i32> = page.items.iter().map(|p| p.post.id.0).collect();
        assert_eq!(ids, (11..=20).collect::<Vec<_>>());
        assert_eq!(viewport.offset(), 0);
        assert_eq!(store.peek(&first_entry), Some(7));
    }
}
